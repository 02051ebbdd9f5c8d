//! Fenced code tracking for the directive preprocessor.
//!
//! Directive markers written inside a fenced block are code samples, not
//! directives, so the preprocessor feeds every line through a [`FenceTracker`].

/// A fence that has been opened and not yet closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    /// Backtick or tilde.
    pub marker: char,
    /// Length of the opening marker run.
    pub length: usize,
    /// 1-based line of the opener.
    pub line: usize,
}

/// Line-by-line CommonMark fence state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    /// Feeds line `line_no`; returns true when the line is part of a fence
    /// (opener, content, or closer).
    pub fn feed(&mut self, line_no: usize, line: &str) -> bool {
        let (columns, bytes) = indent_width(line);
        let rest = &line[bytes..];

        match self.open {
            Some(open) => {
                if columns <= 3
                    && let Some((marker, length)) = marker_run(rest)
                    && marker == open.marker
                    && length >= open.length
                    && rest[length..].trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
            None => {
                let Some((marker, length)) = marker_run(rest) else {
                    return false;
                };
                // Backtick info strings may not contain backticks.
                if columns > 3 || (marker == '`' && rest[length..].contains('`')) {
                    return false;
                }
                self.open = Some(OpenFence {
                    marker,
                    length,
                    line: line_no,
                });
                true
            }
        }
    }

    /// The fence currently open, if any.
    pub fn open_fence(&self) -> Option<&OpenFence> {
        self.open.as_ref()
    }
}

/// Indentation of `line` as (columns, bytes); tabs stop every four columns.
pub(crate) fn indent_width(line: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - columns % 4,
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

// Markers are ASCII, so the run length doubles as a byte offset.
fn marker_run(text: &str) -> Option<(char, usize)> {
    let marker = text.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = text.chars().take_while(|c| *c == marker).count();
    (length >= 3).then_some((marker, length))
}
