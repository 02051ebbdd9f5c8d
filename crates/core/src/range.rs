//! Range specs for stepped code highlighting.
//!
//! A spec such as `1|2-3,5:4-5:9` is a pipe-separated list of steps, each a
//! comma-separated list of ranges. A range is `cursor` or `cursor-cursor`,
//! and a cursor is `line` or `line:column` (both 1-based as written).
//!
//! Lines are counted over the non-empty lines of the block and located by
//! their first textual occurrence, so two identical lines resolve to the
//! first one.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{SlidemarkError, SlidemarkResult};

/// A `line[:column]` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Line number as written (1-based).
    pub line: usize,
    /// Column as written.
    pub column: Option<usize>,
}

impl FromStr for Cursor {
    type Err = SlidemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SlidemarkError::InvalidRangeCursor {
            cursor: s.to_string(),
        };
        let (line, column) = match s.trim().split_once(':') {
            Some((line, column)) => (line, Some(column)),
            None => (s.trim(), None),
        };
        let line = line.trim().parse::<usize>().map_err(|_| invalid())?;
        let column = column
            .map(|c| c.trim().parse::<usize>().map_err(|_| invalid()))
            .transpose()?;
        Ok(Cursor { line, column })
    }
}

/// A single cursor or a `start-end` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Where the highlight starts.
    pub start: Cursor,
    /// Where it ends; `None` runs to the end of the start line.
    pub end: Option<Cursor>,
}

impl FromStr for Range {
    type Err = SlidemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((start, end)) => Ok(Range {
                start: start.parse()?,
                end: Some(end.parse()?),
            }),
            None => Ok(Range {
                start: s.parse()?,
                end: None,
            }),
        }
    }
}

/// Ranges highlighted together in one disclosure step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Step {
    /// Ranges in declaration order.
    pub ranges: Vec<Range>,
}

/// A parsed range spec: an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetaSpec {
    /// Steps in display order.
    pub steps: Vec<Step>,
}

impl MetaSpec {
    /// True when the spec has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromStr for MetaSpec {
    type Err = SlidemarkError;

    /// Empty steps and ranges (`1||2`, `1,,2`, blank specs) are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .split('|')
            .map(|step| {
                step.split(',')
                    .map(str::trim)
                    .filter(|range| !range.is_empty())
                    .map(str::parse)
                    .collect::<SlidemarkResult<Vec<Range>>>()
            })
            .filter(|ranges| !matches!(ranges, Ok(r) if r.is_empty()))
            .map(|ranges| ranges.map(|ranges| Step { ranges }))
            .collect::<SlidemarkResult<Vec<Step>>>()?;
        Ok(MetaSpec { steps })
    }
}

/// Byte span of a line within the block source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

/// Start and end offsets of every non-empty line of a block.
#[derive(Debug, Clone)]
pub struct LineTable<'a> {
    source: &'a str,
    lines: Vec<LineSpan>,
}

impl<'a> LineTable<'a> {
    /// Builds the table for `source`.
    pub fn new(source: &'a str) -> Self {
        let lines = source
            .split('\n')
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                source.find(line).map(|start| LineSpan {
                    start,
                    end: start + line.len(),
                })
            })
            .collect();
        Self { source, lines }
    }

    /// Number of lines in the table.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the block has no non-empty line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Looks up a 1-based line.
    pub fn line(&self, line: usize) -> SlidemarkResult<LineSpan> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .copied()
            .ok_or(SlidemarkError::UnknownLineReference { line })
    }

    /// Absolute offset of a start cursor: the line start, advanced by the
    /// column when one is given.
    pub fn start_offset(&self, cursor: Cursor) -> SlidemarkResult<usize> {
        let span = self.line(cursor.line)?;
        Ok(match cursor.column {
            Some(column) => self.advance(span.start, column),
            None => span.start,
        })
    }

    /// Absolute offset of an end cursor: the line end, or the line start
    /// advanced by the column when one is given.
    pub fn end_offset(&self, cursor: Cursor) -> SlidemarkResult<usize> {
        let span = self.line(cursor.line)?;
        Ok(match cursor.column {
            Some(column) => self.advance(span.start, column),
            None => span.end,
        })
    }

    /// Resolves a range to `(start, end)` offsets.
    pub fn resolve(&self, range: &Range) -> SlidemarkResult<(usize, usize)> {
        let start = self.start_offset(range.start)?;
        let end = match range.end {
            Some(end) => self.end_offset(end)?,
            None => self.line(range.start.line)?.end,
        };
        Ok((start, end))
    }

    /// Moves `chars` characters forward from `offset`, stopping at the end of
    /// the source.
    fn advance(&self, offset: usize, chars: usize) -> usize {
        self.source[offset..]
            .char_indices()
            .nth(chars)
            .map(|(i, _)| offset + i)
            .unwrap_or(self.source.len())
    }
}

/// How a run is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunKind {
    /// Outside every range of the step.
    Dim,
    /// Inside a range of the step.
    Highlight,
}

impl RunKind {
    /// Class applied to the run's wrapper.
    pub fn class_name(self) -> &'static str {
        match self {
            RunKind::Dim => "dim",
            RunKind::Highlight => "highlight",
        }
    }
}

/// A contiguous slice of the block source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Display kind.
    pub kind: RunKind,
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Run {
    /// The run's text.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Splits `source` into dim and highlighted runs for one step.
///
/// Ranges are applied in declaration order. A range starting before the
/// previous one ended only highlights the part not yet emitted, so runs never
/// overlap and always cover the source exactly once.
pub fn segment(table: &LineTable<'_>, step: &Step) -> SlidemarkResult<Vec<Run>> {
    let mut runs = Vec::with_capacity(step.ranges.len() * 2 + 1);
    let mut cursor = 0usize;

    for range in &step.ranges {
        let (start, end) = table.resolve(range)?;
        let start = start.max(cursor);
        push_run(&mut runs, RunKind::Dim, cursor, start);
        push_run(&mut runs, RunKind::Highlight, start, end);
        cursor = cursor.max(end).max(start);
    }
    push_run(&mut runs, RunKind::Dim, cursor, table.source.len());

    Ok(runs)
}

/// Ranges of `step` that start before an earlier range ended.
///
/// [`segment`] clamps these to the part not yet emitted, which may leave
/// nothing of them at all.
pub fn overlapping_ranges(table: &LineTable<'_>, step: &Step) -> SlidemarkResult<Vec<Range>> {
    let mut overlapping = Vec::new();
    let mut cursor = 0usize;
    for range in &step.ranges {
        let (start, end) = table.resolve(range)?;
        if start < cursor {
            overlapping.push(*range);
        }
        cursor = cursor.max(end).max(start);
    }
    Ok(overlapping)
}

/// Segments every step of `spec` against `source`.
pub fn segment_steps(source: &str, spec: &MetaSpec) -> SlidemarkResult<Vec<Vec<Run>>> {
    let table = LineTable::new(source);
    spec.steps.iter().map(|step| segment(&table, step)).collect()
}

fn push_run(runs: &mut Vec<Run>, kind: RunKind, start: usize, end: usize) {
    if end > start {
        runs.push(Run { kind, start, end });
    }
}
