//! Directive dispatch over the content tree.

use super::RenderContext;
use crate::registry::ComponentRegistry;
use slidemark_core::{ContentNode, Properties, Root, SlidemarkResult};

static NO_PROPERTIES: Properties = Properties::new();

/// The element a directive sits in when its component runs.
#[derive(Debug, Clone, Copy)]
pub struct Parent<'a> {
    /// Tag of the parent; `root` at the top level, the directive name for an
    /// unregistered directive.
    pub tag: &'a str,
    /// Parent properties.
    pub properties: &'a Properties,
}

impl<'a> Parent<'a> {
    /// Creates a parent view.
    pub fn new(tag: &'a str, properties: &'a Properties) -> Self {
        Self { tag, properties }
    }

    /// The document root.
    pub fn root() -> Parent<'static> {
        Parent {
            tag: "root",
            properties: &NO_PROPERTIES,
        }
    }
}

/// Replaces every registered directive with its component's output.
///
/// Replacements are visited again at the same index, so directives a
/// component returns (or leaves among the children it wraps) are rendered
/// too. Directives without a component stay in place and their children are
/// still dispatched. The first component error aborts the whole render.
pub fn dispatch(
    root: Root,
    registry: &ComponentRegistry,
    ctx: &mut RenderContext,
) -> SlidemarkResult<Root> {
    let mut children = root.children;
    dispatch_children(&mut children, &Parent::root(), registry, ctx)?;
    Ok(Root::new(children))
}

fn dispatch_children(
    children: &mut [ContentNode],
    parent: &Parent<'_>,
    registry: &ComponentRegistry,
    ctx: &mut RenderContext,
) -> SlidemarkResult<()> {
    let mut index = 0;
    while index < children.len() {
        let node = std::mem::replace(&mut children[index], ContentNode::text(""));
        match node {
            ContentNode::Directive(directive) => match registry.get(&directive.name) {
                Some(component) => {
                    log::debug!(
                        "rendering {} directive '{}' inside <{}>",
                        directive.kind,
                        directive.name,
                        parent.tag
                    );
                    children[index] = component.render(directive, parent, ctx)?;
                    continue;
                }
                None => {
                    let mut directive = directive;
                    let mut nested = std::mem::take(&mut directive.children);
                    let this = Parent::new(&directive.name, &directive.attributes);
                    dispatch_children(&mut nested, &this, registry, ctx)?;
                    directive.children = nested;
                    children[index] = ContentNode::Directive(directive);
                }
            },
            ContentNode::Element(mut element) => {
                let mut nested = std::mem::take(&mut element.children);
                let this = Parent::new(&element.tag, &element.properties);
                dispatch_children(&mut nested, &this, registry, ctx)?;
                element.children = nested;
                children[index] = ContentNode::Element(element);
            }
            text @ ContentNode::Text(_) => children[index] = text,
        }
        index += 1;
    }
    Ok(())
}
