//! Stepped code highlighting over rendered trees.
//!
//! A `code` element inside a `pre` with a `data-meta` range spec is replaced
//! by one clone per step. Every clone holds the whole block split into
//! `span.dim` and `span.highlight` runs; clones after the first also carry
//! the `fragment` class so they reveal one after another.

use slidemark_core::range::{LineTable, MetaSpec, overlapping_ranges, segment_steps};
use slidemark_core::{ContentNode, Element, Root, SlidemarkResult};

/// Language used when a block declares none.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

const LANGUAGE_CLASS_PREFIX: &str = "language-";

/// Syntax highlighter invoked for every run of code text.
pub trait Highlighter {
    /// Highlight `code` written in `language`.
    fn highlight(&self, code: &str, language: &str) -> Vec<ContentNode>;
}

impl<F> Highlighter for F
where
    F: Fn(&str, &str) -> Vec<ContentNode>,
{
    fn highlight(&self, code: &str, language: &str) -> Vec<ContentNode> {
        (self)(code, language)
    }
}

/// Emits the code as a single text node.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> Vec<ContentNode> {
        if code.is_empty() {
            Vec::new()
        } else {
            vec![ContentNode::text(code)]
        }
    }
}

/// Language from the first `language-<word>` class, else `plaintext`.
pub fn language_of(code: &Element) -> &str {
    code.class_list()
        .filter_map(|class| class.strip_prefix(LANGUAGE_CLASS_PREFIX))
        .find(|language| {
            !language.is_empty()
                && language
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_')
        })
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Highlights every `pre > code` block in the tree.
pub fn highlight_code_blocks(root: &mut Root, highlighter: &dyn Highlighter) -> SlidemarkResult<()> {
    highlight_children(&mut root.children, false, highlighter)
}

fn highlight_children(
    children: &mut Vec<ContentNode>,
    in_pre: bool,
    highlighter: &dyn Highlighter,
) -> SlidemarkResult<()> {
    let mut output = Vec::with_capacity(children.len());
    for node in std::mem::take(children) {
        match node {
            ContentNode::Element(element) if in_pre && element.tag == "code" => {
                output.extend(segment_block(&element, highlighter)?.into_iter().map(ContentNode::from));
            }
            ContentNode::Element(mut element) => {
                let is_pre = element.tag == "pre";
                highlight_children(&mut element.children, is_pre, highlighter)?;
                output.push(element.into());
            }
            ContentNode::Directive(mut directive) => {
                highlight_children(&mut directive.children, false, highlighter)?;
                output.push(directive.into());
            }
            text @ ContentNode::Text(_) => output.push(text),
        }
    }
    *children = output;
    Ok(())
}

/// Renders one code element.
///
/// Without a range spec the result is the element with its text passed
/// through the highlighter once. With one, the result holds a clone per
/// step in display order.
pub fn segment_block(code: &Element, highlighter: &dyn Highlighter) -> SlidemarkResult<Vec<Element>> {
    let source = code.text_content();
    let language = language_of(code);
    let spec = match code.properties.get("data-meta").and_then(|meta| meta.as_str()) {
        Some(meta) => meta.parse::<MetaSpec>()?,
        None => MetaSpec::default(),
    };

    if spec.is_empty() {
        return Ok(vec![clone_with_children(
            code,
            highlighter.highlight(&source, language),
        )]);
    }

    let table = LineTable::new(&source);
    for (index, step) in spec.steps.iter().enumerate() {
        for range in overlapping_ranges(&table, step)? {
            log::warn!(
                "range {:?} in step {} of a {} code block overlaps an earlier range; clamped",
                range,
                index + 1,
                language
            );
        }
    }

    let steps = segment_steps(&source, &spec)?;
    log::debug!(
        "splitting {} code block into {} steps",
        language,
        steps.len()
    );

    Ok(steps
        .iter()
        .enumerate()
        .map(|(index, runs)| {
            let children = runs.iter().map(|run| {
                Element::new("span")
                    .class(run.kind.class_name())
                    .children(highlighter.highlight(run.text(&source), language))
                    .into()
            });
            let clone = clone_with_children(code, children.collect());
            if index > 0 { clone.class("fragment") } else { clone }
        })
        .collect())
}

fn clone_with_children(code: &Element, children: Vec<ContentNode>) -> Element {
    Element {
        tag: code.tag.clone(),
        properties: code.properties.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidemark_core::{RunKind, SlidemarkError};

    fn code_block(meta: Option<&str>, text: &str) -> Element {
        let mut code = Element::new("code").property("class", "language-rust hljs");
        if let Some(meta) = meta {
            code = code.property("data-meta", meta);
        }
        code.child(ContentNode::text(text))
    }

    fn runs(block: &Element) -> Vec<(String, String)> {
        block
            .children
            .iter()
            .map(|span| {
                let span = span.as_element().unwrap();
                (
                    span.properties.get("class").unwrap().to_string(),
                    span.text_content(),
                )
            })
            .collect()
    }

    #[test]
    fn language_defaults_to_plaintext() {
        assert_eq!(language_of(&code_block(None, "")), "rust");
        assert_eq!(language_of(&Element::new("code").class("hljs")), "plaintext");
        assert_eq!(
            language_of(&Element::new("code").class("language-")),
            "plaintext"
        );
    }

    #[test]
    fn single_step_is_not_a_fragment() {
        let blocks = segment_block(&code_block(Some("1"), "a\nb\nc"), &PlainHighlighter).unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].has_class("fragment"));
        assert_eq!(
            runs(&blocks[0]),
            vec![
                ("highlight".to_string(), "a".to_string()),
                ("dim".to_string(), "\nb\nc".to_string()),
            ]
        );
    }

    #[test]
    fn later_steps_are_fragments() {
        let blocks =
            segment_block(&code_block(Some("1|2-3"), "line1\nline2\nline3"), &PlainHighlighter)
                .unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].has_class("fragment"));
        assert!(blocks[1].has_class("fragment"));
        assert!(blocks[1].has_class("language-rust"));
        assert_eq!(blocks[1].properties.get("data-meta"), Some(&"1|2-3".into()));
        assert_eq!(
            runs(&blocks[1]),
            vec![
                ("dim".to_string(), "line1\n".to_string()),
                ("highlight".to_string(), "line2\nline3".to_string()),
            ]
        );
    }

    #[test]
    fn every_run_goes_through_the_highlighter() {
        let upper = |code: &str, language: &str| {
            vec![ContentNode::text(format!("{}:{}", language, code.to_uppercase()))]
        };
        let blocks = segment_block(&code_block(Some("2"), "a\nb"), &upper).unwrap();
        assert_eq!(
            runs(&blocks[0]),
            vec![
                (RunKind::Dim.class_name().to_string(), "rust:A\n".to_string()),
                (RunKind::Highlight.class_name().to_string(), "rust:B".to_string()),
            ]
        );
    }

    #[test]
    fn overlapping_ranges_render_clamped() {
        let blocks = segment_block(&code_block(Some("1-2,2"), "a\nb\nc"), &PlainHighlighter).unwrap();
        assert_eq!(
            runs(&blocks[0]),
            vec![
                ("highlight".to_string(), "a\nb".to_string()),
                ("dim".to_string(), "\nc".to_string()),
            ]
        );
    }

    #[test]
    fn block_without_meta_is_highlighted_whole() {
        let blocks = segment_block(&code_block(None, "x"), &PlainHighlighter).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].children, vec![ContentNode::text("x")]);
    }

    #[test]
    fn unknown_line_propagates() {
        let err = segment_block(&code_block(Some("5"), "a\nb\nc"), &PlainHighlighter).unwrap_err();
        assert!(matches!(err, SlidemarkError::UnknownLineReference { line: 5 }));
    }

    #[test]
    fn replaces_code_inside_pre_in_place() {
        let mut root = Root::new(vec![
            Element::new("section")
                .child(
                    Element::new("pre")
                        .class("code-wrapper")
                        .child(code_block(Some("1|2"), "a\nb\n")),
                )
                .child(Element::new("code").child(ContentNode::text("inline")))
                .into(),
        ]);
        highlight_code_blocks(&mut root, &PlainHighlighter).unwrap();

        let section = root.children[0].as_element().unwrap();
        let pre = section.children[0].as_element().unwrap();
        assert_eq!(pre.children.len(), 2);
        let inline = section.children[1].as_element().unwrap();
        assert_eq!(inline.children, vec![ContentNode::text("inline")]);
    }
}
