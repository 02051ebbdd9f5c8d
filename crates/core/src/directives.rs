//! Directive syntax preprocessing.
//!
//! markdown-rs has no directive construct, so directive syntax is rewritten
//! into internal JSX markers before parsing:
//!
//! ```text
//! :::slide                    <mf-directive ref="0">
//! # Title              =>
//! :keyword[Monad]             # Title
//! :::
//!                             <mf-directive ref="1">Monad</mf-directive>
//!
//!                             </mf-directive>
//! ```
//!
//! The name, kind, and attributes of every directive live in a
//! [`DirectiveTable`] indexed by the marker's `ref`, so attribute text never
//! has to survive JSX quoting.

use std::fmt::Write as _;

use crate::code_fence::{FenceTracker, indent_width};
use crate::error::{ParseDiagnostics, ParseWarning, SourceLocation};
use crate::tree::{DirectiveKind, Properties, PropertyValue};

/// Tag of the JSX marker emitted for every directive.
pub const DIRECTIVE_MARKER_TAG: &str = "mf-directive";
/// Marker attribute holding the directive's index in the [`DirectiveTable`].
pub const DIRECTIVE_REF_ATTRIBUTE: &str = "ref";

/// A directive as written in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveOpening {
    /// How the directive was written.
    pub kind: DirectiveKind,
    /// Directive name as written (case preserved).
    pub name: String,
    /// Bracketed label, raw markdown.
    pub label: Option<String>,
    /// Parsed `{...}` attributes.
    pub attributes: Properties,
}

/// Side table of directives found by [`preprocess_directives`].
#[derive(Clone, Debug, Default)]
pub struct DirectiveTable {
    entries: Vec<DirectiveOpening>,
}

impl DirectiveTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a directive and returns its reference index.
    pub fn insert(&mut self, opening: DirectiveOpening) -> usize {
        self.entries.push(opening);
        self.entries.len() - 1
    }

    /// Looks up a directive by reference index.
    pub fn get(&self, index: usize) -> Option<&DirectiveOpening> {
        self.entries.get(index)
    }

    /// Number of recorded directives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no directive was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in source order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectiveOpening> {
        self.entries.iter()
    }
}

/// Output of [`preprocess_directives`].
#[derive(Debug, Default)]
pub struct Preprocessed {
    /// Markdown with directives replaced by JSX markers.
    pub source: String,
    /// Directives referenced by the markers.
    pub directives: DirectiveTable,
    /// Non-fatal findings.
    pub diagnostics: ParseDiagnostics,
}

struct OpenContainer {
    colons: usize,
    leading_ws: String,
    name: String,
    line: usize,
}

/// Rewrites container, leaf, and inline directives into JSX markers.
pub fn preprocess_directives(input: &str) -> Preprocessed {
    let mut fences = FenceTracker::default();
    let mut table = DirectiveTable::new();
    let mut diagnostics = ParseDiagnostics::new();
    let mut output = String::with_capacity(input.len() + 64);
    let mut stack: Vec<OpenContainer> = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        if fences.feed(line_no, line) {
            writeln!(output, "{}", line).ok();
            continue;
        }

        let (_, ws_bytes) = indent_width(line);
        let leading_ws = &line[..ws_bytes];

        if let Some((colons, opening)) = parse_container_opening(line) {
            let label = opening.label.clone();
            let name = opening.name.clone();
            let reference = table.insert(opening);
            writeln!(output).ok();
            writeln!(
                output,
                "{}<{} {}=\"{}\">",
                leading_ws, DIRECTIVE_MARKER_TAG, DIRECTIVE_REF_ATTRIBUTE, reference
            )
            .ok();
            writeln!(output).ok();
            if let Some(label) = label.filter(|l| !l.trim().is_empty()) {
                writeln!(
                    output,
                    "{}{}",
                    leading_ws,
                    rewrite_text_directives(&label, &mut table)
                )
                .ok();
                writeln!(output).ok();
            }
            stack.push(OpenContainer {
                colons,
                leading_ws: leading_ws.to_string(),
                name,
                line: line_no,
            });
            continue;
        }

        if let Some(colons) = closing_colon_run(line)
            && stack.last().is_some_and(|open| colons >= open.colons)
            && let Some(open) = stack.pop()
        {
            write_container_close(&mut output, &open.leading_ws);
            continue;
        }

        if let Some(opening) = parse_leaf_directive(line) {
            let label = opening.label.clone().unwrap_or_default();
            let reference = table.insert(opening);
            writeln!(output).ok();
            if label.trim().is_empty() {
                writeln!(
                    output,
                    "{}<{tag} {attr}=\"{reference}\"></{tag}>",
                    leading_ws,
                    tag = DIRECTIVE_MARKER_TAG,
                    attr = DIRECTIVE_REF_ATTRIBUTE,
                )
                .ok();
            } else {
                let content = rewrite_text_directives(&label, &mut table);
                writeln!(
                    output,
                    "{ws}<{tag} {attr}=\"{reference}\">\n\n{ws}{content}\n\n{ws}</{tag}>",
                    ws = leading_ws,
                    tag = DIRECTIVE_MARKER_TAG,
                    attr = DIRECTIVE_REF_ATTRIBUTE,
                )
                .ok();
            }
            writeln!(output).ok();
            continue;
        }

        writeln!(output, "{}", rewrite_text_directives(line, &mut table)).ok();
    }

    if let Some(fence) = fences.open_fence() {
        diagnostics.add_warning(ParseWarning::UnclosedCodeFence {
            location: SourceLocation::new(fence.line, 1),
            marker: fence.marker,
        });
    }

    while let Some(open) = stack.pop() {
        diagnostics.add_warning(ParseWarning::UnclosedDirective {
            location: SourceLocation::new(open.line, 1),
            name: open.name,
        });
        write_container_close(&mut output, &open.leading_ws);
    }

    Preprocessed {
        source: output,
        directives: table,
        diagnostics,
    }
}

fn write_container_close(output: &mut String, leading_ws: &str) {
    writeln!(output).ok();
    writeln!(output, "{}</{}>", leading_ws, DIRECTIVE_MARKER_TAG).ok();
    writeln!(output).ok();
}

/// Parses a container opening such as `:::::slide{.title}`.
///
/// Returns the colon count (closers need at least as many) and the opening.
pub fn parse_container_opening(line: &str) -> Option<(usize, DirectiveOpening)> {
    let trimmed = line.trim();
    let colons = trimmed.bytes().take_while(|b| *b == b':').count();
    if colons < 3 {
        return None;
    }
    let (opening, consumed) = parse_directive_body(&trimmed[colons..], DirectiveKind::Container)?;
    trimmed[colons + consumed..]
        .trim()
        .is_empty()
        .then_some((colons, opening))
}

/// Parses a leaf directive line such as `::fragment[text]{index=1}`.
pub fn parse_leaf_directive(line: &str) -> Option<DirectiveOpening> {
    let trimmed = line.trim();
    if !trimmed.starts_with("::") || trimmed.starts_with(":::") {
        return None;
    }
    let (opening, consumed) = parse_directive_body(&trimmed[2..], DirectiveKind::Leaf)?;
    trimmed[2 + consumed..]
        .trim()
        .is_empty()
        .then_some(opening)
}

/// Returns the colon count when the line consists of three or more colons only.
pub fn closing_colon_run(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    (trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b':')).then_some(trimmed.len())
}

/// Parses `name[label]{attrs}` and returns the opening plus bytes consumed.
fn parse_directive_body(input: &str, kind: DirectiveKind) -> Option<(DirectiveOpening, usize)> {
    let name_len = directive_name_len(input);
    if name_len == 0 {
        return None;
    }
    let name = input[..name_len].to_string();
    let mut consumed = name_len;

    let mut label = None;
    if input[consumed..].starts_with('[') {
        let (text, used) = bracketed_label(&input[consumed..])?;
        label = Some(text.to_string());
        consumed += used;
    }

    let mut attributes = Properties::new();
    if input[consumed..].starts_with('{') {
        let (raw, used) = attribute_block(&input[consumed..])?;
        attributes = parse_attributes(raw);
        consumed += used;
    }

    Some((
        DirectiveOpening {
            kind,
            name,
            label,
            attributes,
        },
        consumed,
    ))
}

fn directive_name_len(input: &str) -> usize {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(input.len())
}

/// `input` starts with `[`; returns the label and the bytes consumed
/// including both brackets. Nested brackets and backslash escapes are honoured.
fn bracketed_label(input: &str) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&input[1..i], i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// `input` starts with `{`; returns the inner text and the bytes consumed.
fn attribute_block(input: &str) -> Option<(&str, usize)> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '}') => return Some((&input[1..i], i + 1)),
            (None, _) => {}
        }
    }
    None
}

/// Parses the inside of a `{...}` attribute block.
///
/// Supports `#id`, `.class`, `key=value`, `key="value"`, `key='value'`, and
/// bare `flag`. Unquoted numeric values become numbers.
pub fn parse_attributes(raw: &str) -> Properties {
    let mut attributes = Properties::new();
    let mut classes: Vec<String> = Vec::new();
    let mut rest = raw.trim_start();

    while let Some(first) = rest.chars().next() {
        match first {
            '#' | '.' => {
                let end = rest[1..]
                    .find(|c: char| c.is_whitespace() || c == '#' || c == '.')
                    .map(|i| i + 1)
                    .unwrap_or(rest.len());
                let value = &rest[1..end];
                if !value.is_empty() {
                    if first == '#' {
                        attributes.insert("id".to_string(), value.into());
                    } else {
                        classes.push(value.to_string());
                    }
                }
                rest = &rest[end..];
            }
            _ => {
                let key_end = rest
                    .find(|c: char| c.is_whitespace() || c == '=')
                    .unwrap_or(rest.len());
                let key = &rest[..key_end];
                rest = rest[key_end..].trim_start();

                let value = if let Some(after_eq) = rest.strip_prefix('=') {
                    let (value, remaining) = attribute_value(after_eq.trim_start());
                    rest = remaining;
                    value
                } else {
                    PropertyValue::String(String::new())
                };

                if key == "class" {
                    classes.push(value.to_string());
                } else if !key.is_empty() {
                    attributes.insert(key.to_string(), value);
                }
            }
        }
        rest = rest.trim_start();
    }

    if !classes.is_empty() {
        attributes.insert("class".to_string(), classes.join(" ").into());
    }

    attributes
}

fn attribute_value(input: &str) -> (PropertyValue, &str) {
    if let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let body = &input[1..];
        return match body.find(quote) {
            Some(end) => (body[..end].into(), &body[end + 1..]),
            None => (body.into(), ""),
        };
    }

    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let raw = &input[..end];
    let numeric = !raw.is_empty()
        && raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'));
    let value = match raw.parse::<f64>() {
        Ok(n) if numeric => PropertyValue::Number(n),
        _ => raw.into(),
    };
    (value, &input[end..])
}

/// Rewrites inline directives (`:name[label]{attrs}`) within one line.
///
/// Code spans and backslash escapes are copied verbatim.
fn rewrite_text_directives(line: &str, table: &mut DirectiveTable) -> String {
    let mut output = String::with_capacity(line.len());
    let mut prev: Option<char> = None;
    let mut i = 0usize;

    while let Some(ch) = line[i..].chars().next() {
        let rest = &line[i..];
        match ch {
            '`' => {
                let run = rest.bytes().take_while(|b| *b == b'`').count();
                let span_len = code_span_len(rest, run).unwrap_or(run);
                output.push_str(&rest[..span_len]);
                i += span_len;
                prev = Some('`');
                continue;
            }
            '\\' => {
                let escaped_len = rest[1..].chars().next().map_or(0, char::len_utf8);
                output.push_str(&rest[..1 + escaped_len]);
                i += 1 + escaped_len;
                prev = Some('\\');
                continue;
            }
            ':' if !prev.is_some_and(|p| p.is_alphanumeric() || p == ':') => {
                if let Some((opening, consumed)) =
                    parse_directive_body(&rest[1..], DirectiveKind::Inline)
                    && (opening.label.is_some() || consumed > opening.name.len())
                {
                    let label = opening.label.clone().unwrap_or_default();
                    let reference = table.insert(opening);
                    let content = rewrite_text_directives(&label, table);
                    write!(
                        output,
                        "<{tag} {attr}=\"{reference}\">{content}</{tag}>",
                        tag = DIRECTIVE_MARKER_TAG,
                        attr = DIRECTIVE_REF_ATTRIBUTE,
                    )
                    .ok();
                    i += 1 + consumed;
                    prev = Some(']');
                    continue;
                }
            }
            _ => {}
        }
        output.push(ch);
        i += ch.len_utf8();
        prev = Some(ch);
    }

    output
}

/// Length of a code span opened by `run` backticks, when it is closed.
fn code_span_len(rest: &str, run: usize) -> Option<usize> {
    let body = &rest[run..];
    let mut offset = 0usize;
    while let Some(found) = body[offset..].find('`') {
        let start = offset + found;
        let len = body[start..].bytes().take_while(|b| *b == b'`').count();
        if len == run {
            return Some(run + start + len);
        }
        offset = start + len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_container_with_label_and_attrs() {
        let (colons, opening) =
            parse_container_opening(":::::slide[Intro]{#first .title data-x=1}").unwrap();
        assert_eq!(colons, 5);
        assert_eq!(opening.kind, DirectiveKind::Container);
        assert_eq!(opening.name, "slide");
        assert_eq!(opening.label.as_deref(), Some("Intro"));
        assert_eq!(opening.attributes.get("id"), Some(&"first".into()));
        assert_eq!(opening.attributes.get("class"), Some(&"title".into()));
        assert_eq!(opening.attributes.get("data-x"), Some(&PropertyValue::Number(1.0)));
    }

    #[test]
    fn container_requires_three_colons_and_a_name() {
        assert!(parse_container_opening("::slide").is_none());
        assert!(parse_container_opening(":::").is_none());
        assert!(parse_container_opening(":::1slide").is_none());
        assert!(parse_container_opening(":::slide trailing words").is_none());
    }

    #[test]
    fn parses_leaf_with_spaced_attribute() {
        let opening = parse_leaf_directive("::quote[quote-content]{source = \"I said that\"}").unwrap();
        assert_eq!(opening.kind, DirectiveKind::Leaf);
        assert_eq!(opening.name, "quote");
        assert_eq!(opening.label.as_deref(), Some("quote-content"));
        assert_eq!(opening.attributes.get("source"), Some(&"I said that".into()));
    }

    #[test]
    fn leaf_is_not_container() {
        assert!(parse_leaf_directive(":::fragment").is_none());
        assert!(parse_leaf_directive("::define-var{id=x}").is_some());
    }

    #[test]
    fn attributes_cover_shorthands_and_literals() {
        let attrs = parse_attributes("#main .a .b class=\"c\" index=2 label='x y' flag ratio=1.5 v=1a");
        assert_eq!(attrs.get("id"), Some(&"main".into()));
        assert_eq!(attrs.get("class"), Some(&"a b c".into()));
        assert_eq!(attrs.get("index"), Some(&PropertyValue::Number(2.0)));
        assert_eq!(attrs.get("label"), Some(&"x y".into()));
        assert_eq!(attrs.get("flag"), Some(&"".into()));
        assert_eq!(attrs.get("ratio"), Some(&PropertyValue::Number(1.5)));
        assert_eq!(attrs.get("v"), Some(&"1a".into()));
    }

    #[test]
    fn closers_are_colon_runs() {
        assert_eq!(closing_colon_run(":::"), Some(3));
        assert_eq!(closing_colon_run("  ::::::  "), Some(6));
        assert_eq!(closing_colon_run("::"), None);
        assert_eq!(closing_colon_run(":::note"), None);
    }

    #[test]
    fn rewrites_container_and_records_table() {
        let result = preprocess_directives(":::slide\n# Title\n:::");
        assert_eq!(result.directives.len(), 1);
        assert_eq!(result.directives.get(0).unwrap().name, "slide");
        assert_eq!(
            result.source,
            "\n<mf-directive ref=\"0\">\n\n# Title\n\n</mf-directive>\n\n"
        );
        assert!(!result.diagnostics.has_warnings());
    }

    #[test]
    fn closer_must_match_opener_length() {
        let input = "::::columns\n:::column\nLeft\n:::\n::::";
        let result = preprocess_directives(input);
        assert_eq!(result.directives.len(), 2);
        let closes = result.source.matches("</mf-directive>").count();
        assert_eq!(closes, 2);
        assert!(!result.diagnostics.has_warnings());
    }

    #[test]
    fn short_closer_does_not_close_long_opener() {
        let result = preprocess_directives("::::::slide\ntext\n:::\n::::::");
        assert_eq!(result.directives.len(), 1);
        assert!(result.source.contains("\n:::\n"));
    }

    #[test]
    fn rewrites_inline_directives_with_nesting() {
        let result = preprocess_directives("Say :fragment[hello :keyword[world]] now");
        assert_eq!(
            result.source,
            "Say <mf-directive ref=\"0\">hello <mf-directive ref=\"1\">world</mf-directive></mf-directive> now\n"
        );
        assert_eq!(result.directives.get(0).unwrap().kind, DirectiveKind::Inline);
        assert_eq!(result.directives.get(1).unwrap().name, "keyword");
    }

    #[test]
    fn ignores_colons_that_are_not_directives() {
        let input = "Time 10:30, see https://example.com and :smile: or `:keyword[x]`";
        let result = preprocess_directives(input);
        assert!(result.directives.is_empty());
        assert_eq!(result.source, format!("{}\n", input));
    }

    #[test]
    fn escaped_colon_stays_literal() {
        let result = preprocess_directives("\\:keyword[x]");
        assert!(result.directives.is_empty());
    }

    #[test]
    fn leaf_label_is_wrapped_on_its_own_lines() {
        let result = preprocess_directives("::fragment[appear]{index=1}");
        assert_eq!(
            result.source,
            "\n<mf-directive ref=\"0\">\n\nappear\n\n</mf-directive>\n\n"
        );
        let opening = result.directives.get(0).unwrap();
        assert_eq!(opening.attributes.get("index"), Some(&PropertyValue::Number(1.0)));
    }

    #[test]
    fn empty_leaf_is_self_contained() {
        let result = preprocess_directives("::var{id=title}");
        assert_eq!(result.source, "\n<mf-directive ref=\"0\"></mf-directive>\n\n");
    }

    #[test]
    fn fenced_directives_are_untouched() {
        let input = "```md\n:::slide\n:keyword[x]\n:::\n```";
        let result = preprocess_directives(input);
        assert!(result.directives.is_empty());
        assert_eq!(result.source, format!("{}\n", input));
    }

    #[test]
    fn unclosed_container_is_closed_with_warning() {
        let result = preprocess_directives("text\n:::slide\nbody");
        assert!(result.source.trim_end().ends_with("</mf-directive>"));
        assert_eq!(
            result.diagnostics.warnings,
            vec![ParseWarning::UnclosedDirective {
                location: SourceLocation::new(2, 1),
                name: "slide".into(),
            }]
        );
    }

    #[test]
    fn unclosed_fence_is_reported() {
        let result = preprocess_directives("a\n~~~\ncode");
        assert_eq!(
            result.diagnostics.warnings,
            vec![ParseWarning::UnclosedCodeFence {
                location: SourceLocation::new(2, 1),
                marker: '~',
            }]
        );
    }

    #[test]
    fn inline_labels_stay_on_one_line() {
        let input = "Text :fragment[hello\nworld] end";
        let result = preprocess_directives(input);
        assert!(result.directives.is_empty());
        assert_eq!(result.source, format!("{}\n", input));
    }

    #[test]
    fn containers_inside_blockquotes_stay_literal() {
        let input = "> :::note\n> body\n> :::";
        let result = preprocess_directives(input);
        assert!(result.directives.is_empty());
        assert_eq!(result.source, format!("{}\n", input));
    }

    #[test]
    fn container_label_becomes_first_paragraph() {
        let result = preprocess_directives(":::quote[Famous]\nbody\n:::");
        assert!(result.source.contains("<mf-directive ref=\"0\">\n\nFamous\n\nbody"));
    }
}
