//! Built-in slide components.
//!
//! Each function renders one directive. Class-only directives (`keyword`,
//! `columns`, ...) use [`ClassComponent`](crate::registry::ClassComponent)
//! instead of a function here.

use crate::renderer::{Parent, RenderContext};
use slidemark_core::{
    ContentNode, DirectiveKind, DirectiveNode, Element, PropertyValue, SlidemarkError,
    SlidemarkResult,
};

/// Block quote with an optional `source` line.
///
/// ```markdown
/// ::quote[quote-content]{source = "I said that"}
/// ```
pub fn quote(
    mut node: DirectiveNode,
    _parent: &Parent<'_>,
    _ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let source = node
        .attributes
        .remove("source")
        .filter(|source| !source.is_empty_string());

    let mut quote = Element::new("div")
        .properties(node.attributes)
        .class("quote")
        .children(node.children);
    if let Some(source) = source {
        quote = quote.child(
            Element::new("div")
                .class("quote-source")
                .child(ContentNode::text(source.to_string())),
        );
    }
    Ok(quote.into())
}

/// Slide section headed by a copy of the current shell.
pub fn slide(
    node: DirectiveNode,
    _parent: &Parent<'_>,
    ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let shell = Element::new("div")
        .class("__shell")
        .children(ctx.shell().to_vec());
    Ok(Element::new("section")
        .properties(node.attributes)
        .child(shell)
        .children(node.children)
        .into())
}

/// Reveal step. `index` becomes `data-fragment-index`.
pub fn fragment(
    mut node: DirectiveNode,
    _parent: &Parent<'_>,
    _ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let index = node.attributes.remove("index");
    let mut fragment = Element::new(node.kind.block_or_inline_tag())
        .properties(node.attributes)
        .class("fragment");
    if let Some(index) = index {
        fragment = fragment.property("data-fragment-index", index);
    }
    Ok(fragment.children(node.children).into())
}

/// Content only shown in the speaker view.
pub fn speaker(
    node: DirectiveNode,
    _parent: &Parent<'_>,
    _ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let wrapper = match node.kind {
        DirectiveKind::Inline => Element::new("span").class("speaker-note"),
        DirectiveKind::Leaf => Element::new("div").class("speaker-note"),
        DirectiveKind::Container => Element::new("aside").class("notes"),
    };
    Ok(wrapper.children(node.children).into())
}

/// Diagram source: every descendant text node, markup dropped.
pub fn mermaid(
    node: DirectiveNode,
    _parent: &Parent<'_>,
    _ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let mut texts = Vec::new();
    collect_text_nodes(node.children, &mut texts);
    Ok(Element::new("pre")
        .properties(node.attributes)
        .class("mermaid")
        .children(texts)
        .into())
}

fn collect_text_nodes(nodes: Vec<ContentNode>, texts: &mut Vec<ContentNode>) {
    for node in nodes {
        match node {
            text @ ContentNode::Text(_) => texts.push(text),
            ContentNode::Element(element) => collect_text_nodes(element.children, texts),
            ContentNode::Directive(directive) => collect_text_nodes(directive.children, texts),
        }
    }
}

/// Stores its children as the shell of every following slide.
pub fn shell(
    node: DirectiveNode,
    _parent: &Parent<'_>,
    ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    ctx.set_shell(node.children.clone());
    Ok(Element::new("div")
        .property("id", "__shell")
        .children(node.children)
        .into())
}

/// Stores its children under `id` for later `var` directives.
pub fn define_var(
    node: DirectiveNode,
    _parent: &Parent<'_>,
    ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let id = required_id(&node)?;
    ctx.define_variable(id.to_string(), node.children.clone());
    Ok(Element::new("template")
        .property("id", id)
        .children(node.children)
        .into())
}

/// Copy of the children stored by an earlier `define-var`.
pub fn var(
    node: DirectiveNode,
    _parent: &Parent<'_>,
    ctx: &mut RenderContext,
) -> SlidemarkResult<ContentNode> {
    let id = required_id(&node)?.to_string();
    let children = ctx
        .variable(&id)
        .ok_or_else(|| SlidemarkError::UndefinedVariableReference { id: id.clone() })?
        .to_vec();
    Ok(Element::new(node.kind.block_or_inline_tag())
        .property("class", id)
        .children(children)
        .into())
}

fn required_id(node: &DirectiveNode) -> SlidemarkResult<PropertyValue> {
    node.attribute("id")
        .cloned()
        .ok_or_else(|| SlidemarkError::missing_attribute(node.name.as_str(), "id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidemark_core::Properties;

    fn directive(kind: DirectiveKind, name: &str) -> DirectiveNode {
        DirectiveNode::new(kind, name)
    }

    fn call(
        component: fn(DirectiveNode, &Parent<'_>, &mut RenderContext) -> SlidemarkResult<ContentNode>,
        node: DirectiveNode,
        ctx: &mut RenderContext,
    ) -> SlidemarkResult<Element> {
        let properties = Properties::new();
        let rendered = component(node, &Parent::new("root", &properties), ctx)?;
        match rendered {
            ContentNode::Element(element) => Ok(element),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn quote_appends_source() {
        let mut node = directive(DirectiveKind::Leaf, "quote");
        node.attributes.insert("source".into(), "I said that".into());
        node.children.push(ContentNode::text("quote-content"));

        let element = call(quote, node, &mut RenderContext::new()).unwrap();
        assert_eq!(element.tag, "div");
        assert_eq!(element.properties.get("class"), Some(&"quote".into()));
        assert!(element.properties.get("source").is_none());
        assert_eq!(element.children[0], ContentNode::text("quote-content"));
        let source = element.children[1].as_element().unwrap();
        assert!(source.has_class("quote-source"));
        assert_eq!(source.text_content(), "I said that");
    }

    #[test]
    fn quote_without_source_has_no_trailer() {
        let mut node = directive(DirectiveKind::Container, "quote");
        node.children.push(ContentNode::text("q"));
        let element = call(quote, node, &mut RenderContext::new()).unwrap();
        assert_eq!(element.children.len(), 1);
    }

    #[test]
    fn slide_prepends_shell_copy() {
        let mut ctx = RenderContext::new();
        ctx.set_shell(vec![ContentNode::text("logo")]);
        let mut node = directive(DirectiveKind::Container, "slide");
        node.attributes.insert("class".into(), "title".into());
        node.children.push(ContentNode::text("body"));

        let element = call(slide, node, &mut ctx).unwrap();
        assert_eq!(element.tag, "section");
        assert_eq!(element.properties.get("class"), Some(&"title".into()));
        let header = element.children[0].as_element().unwrap();
        assert!(header.has_class("__shell"));
        assert_eq!(header.children, vec![ContentNode::text("logo")]);
        assert_eq!(element.children[1], ContentNode::text("body"));
    }

    #[test]
    fn fragment_sets_index_and_tag_by_kind() {
        let mut node = directive(DirectiveKind::Inline, "fragment");
        node.attributes.insert("index".into(), PropertyValue::Number(2.0));
        let element = call(fragment, node, &mut RenderContext::new()).unwrap();
        assert_eq!(element.tag, "span");
        assert!(element.has_class("fragment"));
        assert_eq!(
            element.properties.get("data-fragment-index"),
            Some(&PropertyValue::Number(2.0))
        );
        assert!(element.properties.get("index").is_none());

        let element = call(
            fragment,
            directive(DirectiveKind::Container, "fragment"),
            &mut RenderContext::new(),
        )
        .unwrap();
        assert_eq!(element.tag, "div");
        assert!(element.properties.get("data-fragment-index").is_none());
    }

    #[test]
    fn speaker_wrapper_depends_on_kind() {
        let cases = [
            (DirectiveKind::Inline, "span", "speaker-note"),
            (DirectiveKind::Leaf, "div", "speaker-note"),
            (DirectiveKind::Container, "aside", "notes"),
        ];
        for (kind, tag, class) in cases {
            let element = call(speaker, directive(kind, "speaker"), &mut RenderContext::new()).unwrap();
            assert_eq!(element.tag, tag);
            assert!(element.has_class(class));
        }
    }

    #[test]
    fn mermaid_flattens_text() {
        let mut node = directive(DirectiveKind::Container, "mermaid");
        node.children.push(
            Element::new("p")
                .child(ContentNode::text("flowchart LR\n"))
                .child(Element::new("em").child(ContentNode::text("A-->B")))
                .into(),
        );
        let element = call(mermaid, node, &mut RenderContext::new()).unwrap();
        assert_eq!(element.tag, "pre");
        assert!(element.has_class("mermaid"));
        assert_eq!(
            element.children,
            vec![ContentNode::text("flowchart LR\n"), ContentNode::text("A-->B")]
        );
    }

    #[test]
    fn shell_stores_and_renders_placeholder() {
        let mut ctx = RenderContext::new();
        let mut node = directive(DirectiveKind::Container, "shell");
        node.children.push(ContentNode::text("header"));
        let element = call(shell, node, &mut ctx).unwrap();
        assert_eq!(element.properties.get("id"), Some(&"__shell".into()));
        assert_eq!(ctx.shell(), &[ContentNode::text("header")]);
    }

    #[test]
    fn define_var_then_var_clones_children() {
        let mut ctx = RenderContext::new();
        let mut define = directive(DirectiveKind::Leaf, "define-var");
        define.attributes.insert("id".into(), "title".into());
        define.children.push(ContentNode::text("Monads"));
        let template = call(define_var, define, &mut ctx).unwrap();
        assert_eq!(template.tag, "template");
        assert_eq!(template.properties.get("id"), Some(&"title".into()));

        let mut reference = directive(DirectiveKind::Inline, "var");
        reference.attributes.insert("id".into(), "title".into());
        let element = call(var, reference, &mut ctx).unwrap();
        assert_eq!(element.tag, "span");
        assert_eq!(element.properties.get("class"), Some(&"title".into()));
        assert_eq!(element.children, vec![ContentNode::text("Monads")]);
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let mut ctx = RenderContext::new();
        let mut define = directive(DirectiveKind::Leaf, "define-var");
        define.attributes.insert("id".into(), PropertyValue::Number(1.0));
        call(define_var, define, &mut ctx).unwrap();
        assert!(ctx.variable("1").is_some());

        let mut reference = directive(DirectiveKind::Leaf, "var");
        reference.attributes.insert("id".into(), "1".into());
        let element = call(var, reference, &mut ctx).unwrap();
        assert_eq!(element.tag, "div");
    }

    #[test]
    fn missing_id_is_an_error() {
        let err = call(
            define_var,
            directive(DirectiveKind::Leaf, "define-var"),
            &mut RenderContext::new(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "define-var needs an id");

        let err = call(var, directive(DirectiveKind::Leaf, "var"), &mut RenderContext::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "var needs an id");
    }

    #[test]
    fn undefined_var_is_an_error() {
        let mut reference = directive(DirectiveKind::Inline, "var");
        reference.attributes.insert("id".into(), "nope".into());
        let err = call(var, reference, &mut RenderContext::new()).unwrap_err();
        assert!(matches!(err, SlidemarkError::UndefinedVariableReference { id } if id == "nope"));
    }
}
