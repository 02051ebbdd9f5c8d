//! Markdown parsing with directive markers.

use crate::directives::{DirectiveTable, preprocess_directives};
use crate::{ParseDiagnostics, SlidemarkError, SlidemarkResult, SourceLocation};
use markdown::mdast::Node;
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Rewrite directive syntax into markers before parsing.
    pub directives: bool,
}

impl ParseOptions {
    /// Slide defaults: GFM and directives on.
    pub const fn slides() -> Self {
        Self {
            gfm: true,
            directives: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// JSX is always on because directive markers are JSX elements. Raw HTML
    /// and indented code stay off so markers and indented directive bodies
    /// are never swallowed.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            code_indented: false,
            html_flow: false,
            html_text: false,
            mdx_jsx_flow: true,
            mdx_jsx_text: true,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::slides()
    }
}

/// A parsed document plus the directives its markers reference.
#[derive(Debug)]
pub struct ParsedDocument {
    /// Markdown AST root.
    pub mdast: Node,
    /// Text that was parsed; mdast positions index into it.
    pub source: String,
    /// Directive side table.
    pub directives: DirectiveTable,
    /// Non-fatal preprocessing findings.
    pub diagnostics: ParseDiagnostics,
}

/// Preprocesses directives (when enabled) and parses the result.
pub fn parse_document(input: &str, options: &ParseOptions) -> SlidemarkResult<ParsedDocument> {
    if !options.directives {
        return Ok(ParsedDocument {
            mdast: parse_mdast(input, options)?,
            source: input.to_string(),
            directives: DirectiveTable::new(),
            diagnostics: ParseDiagnostics::new(),
        });
    }

    let preprocessed = preprocess_directives(input);
    let mdast = parse_mdast(&preprocessed.source, options)?;
    Ok(ParsedDocument {
        mdast,
        source: preprocessed.source,
        directives: preprocessed.directives,
        diagnostics: preprocessed.diagnostics,
    })
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> SlidemarkResult<Node> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| {
        SlidemarkError::MarkdownAdapter {
            message: err.reason.clone(),
            location: message_location(&err),
        }
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_markers_parse_as_jsx() {
        let parsed = parse_document(":::slide\n# Hi\n:::", &ParseOptions::slides()).unwrap();
        let Node::Root(root) = &parsed.mdast else {
            panic!("expected root");
        };
        let Node::MdxJsxFlowElement(marker) = &root.children[0] else {
            panic!("expected marker, got {:?}", root.children[0]);
        };
        assert_eq!(marker.name.as_deref(), Some("mf-directive"));
        assert!(matches!(marker.children[0], Node::Heading(_)));
        assert_eq!(parsed.directives.len(), 1);
    }

    #[test]
    fn indented_lines_are_not_code() {
        let mdast = parse_mdast("    indented", &ParseOptions::slides()).unwrap();
        let Node::Root(root) = mdast else {
            panic!("expected root");
        };
        assert!(matches!(root.children[0], Node::Paragraph(_)));
    }

    #[test]
    fn directives_can_be_left_alone() {
        let options = ParseOptions {
            gfm: true,
            directives: false,
        };
        let parsed = parse_document(":keyword[x]", &options).unwrap();
        assert!(parsed.directives.is_empty());
    }

    #[test]
    fn unclosed_jsx_reports_location() {
        let err = parse_mdast("<b>\n\nx", &ParseOptions::slides()).unwrap_err();
        let SlidemarkError::MarkdownAdapter { message, location } = &err else {
            panic!("expected adapter error, got {:?}", err);
        };
        assert_eq!(*location, SourceLocation::new(3, 2));
        assert!(message.starts_with("Expected a closing tag"));
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let mdast = parse_mdast("a\n\n<b", &ParseOptions::slides()).unwrap();
        let Node::Root(root) = mdast else {
            panic!("expected root");
        };
        assert_eq!(root.children.len(), 2);
        assert!(matches!(root.children[1], Node::Paragraph(_)));
    }
}
