//! Turns directive marker elements into typed [`DirectiveNode`]s.

use crate::directives::{DIRECTIVE_MARKER_TAG, DIRECTIVE_REF_ATTRIBUTE, DirectiveTable};
use crate::tree::{ContentNode, DirectiveKind, DirectiveNode, Element, Properties, Root};
use crate::{SlidemarkError, SlidemarkResult};

/// Classifies every marker in the document.
///
/// Markers carrying a `ref` take their kind, name, and attributes from the
/// table. Markers without one must describe themselves with `name` and
/// `kind` properties; the remaining properties become attributes.
pub fn classify(root: Root, directives: &DirectiveTable) -> SlidemarkResult<Root> {
    Ok(Root::new(classify_nodes(root.children, directives)?))
}

fn classify_nodes(
    nodes: Vec<ContentNode>,
    directives: &DirectiveTable,
) -> SlidemarkResult<Vec<ContentNode>> {
    nodes
        .into_iter()
        .map(|node| classify_node(node, directives))
        .collect()
}

/// Classifies a single node and its descendants.
pub fn classify_node(node: ContentNode, directives: &DirectiveTable) -> SlidemarkResult<ContentNode> {
    match node {
        ContentNode::Element(element) if element.tag == DIRECTIVE_MARKER_TAG => {
            classify_marker(element, directives).map(ContentNode::Directive)
        }
        ContentNode::Element(mut element) => {
            element.children = classify_nodes(element.children, directives)?;
            Ok(ContentNode::Element(element))
        }
        ContentNode::Directive(mut directive) => {
            directive.children = classify_nodes(directive.children, directives)?;
            Ok(ContentNode::Directive(directive))
        }
        text @ ContentNode::Text(_) => Ok(text),
    }
}

fn classify_marker(marker: Element, directives: &DirectiveTable) -> SlidemarkResult<DirectiveNode> {
    let Element {
        mut properties,
        children,
        ..
    } = marker;

    let (kind, name, attributes) = match properties.remove(DIRECTIVE_REF_ATTRIBUTE) {
        Some(reference) => {
            let index = reference
                .to_string()
                .parse::<usize>()
                .map_err(|_| SlidemarkError::InternalError(format!("bad directive ref '{reference}'")))?;
            let opening = directives.get(index).ok_or_else(|| {
                SlidemarkError::InternalError(format!("directive ref {index} is not in the table"))
            })?;
            (opening.kind, opening.name.clone(), opening.attributes.clone())
        }
        None => self_described(properties)?,
    };

    let mut children = classify_nodes(children, directives)?;
    if kind == DirectiveKind::Leaf {
        children = unwrap_lone_paragraph(children);
    }

    Ok(DirectiveNode {
        kind,
        name,
        attributes,
        children,
    })
}

fn self_described(mut properties: Properties) -> SlidemarkResult<(DirectiveKind, String, Properties)> {
    let name = properties
        .remove("name")
        .map(|value| value.to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SlidemarkError::missing_attribute(DIRECTIVE_MARKER_TAG, "name"))?;
    let kind = properties
        .remove("kind")
        .map(|value| value.to_string())
        .unwrap_or_default()
        .parse::<DirectiveKind>()?;
    Ok((kind, name, properties))
}

fn unwrap_lone_paragraph(mut children: Vec<ContentNode>) -> Vec<ContentNode> {
    if children.len() == 1
        && let Some(ContentNode::Element(paragraph)) = children.first()
        && paragraph.tag == "p"
        && paragraph.properties.is_empty()
        && let Some(ContentNode::Element(paragraph)) = children.pop()
    {
        return paragraph.children;
    }
    children
}
