//! Component registry: directive names mapped to rendering functions.

/// Built-in registry contents.
pub mod defaults;
/// Registry configuration types.
pub mod types;

pub use types::{ClassDirective, RegistryConfig};

use crate::renderer::{Parent, RenderContext};
use slidemark_core::{ContentNode, DirectiveNode, Element, SlidemarkResult};
use std::collections::HashMap;
use std::fmt;

/// Renders one directive into the node that replaces it.
///
/// Components hold no state of their own; anything that must outlive the
/// call goes through the [`RenderContext`].
pub trait Component {
    /// Render `node`, which sits inside `parent`.
    fn render(
        &self,
        node: DirectiveNode,
        parent: &Parent<'_>,
        ctx: &mut RenderContext,
    ) -> SlidemarkResult<ContentNode>;
}

impl<F> Component for F
where
    F: Fn(DirectiveNode, &Parent<'_>, &mut RenderContext) -> SlidemarkResult<ContentNode>,
{
    fn render(
        &self,
        node: DirectiveNode,
        parent: &Parent<'_>,
        ctx: &mut RenderContext,
    ) -> SlidemarkResult<ContentNode> {
        (self)(node, parent, ctx)
    }
}

/// Wraps the directive's children in a `span` (inline) or `div` and adds a
/// fixed class after any class the author gave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassComponent {
    class: String,
}

impl ClassComponent {
    /// Creates a component adding `class`.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }
}

impl Component for ClassComponent {
    fn render(
        &self,
        node: DirectiveNode,
        _parent: &Parent<'_>,
        _ctx: &mut RenderContext,
    ) -> SlidemarkResult<ContentNode> {
        Ok(Element::new(node.kind.block_or_inline_tag())
            .properties(node.attributes)
            .class(self.class.as_str())
            .children(node.children)
            .into())
    }
}

/// Directive name → component lookup used by the dispatcher.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Box<dyn Component>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in components plus the configured class directives.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let mut registry = defaults::default_slide_registry();
        let builtins = defaults::default_directive_names();
        for entry in &config.class_directives {
            if builtins.iter().any(|name| *name == entry.directive) {
                log::debug!(
                    "class directive '{}' replaces the built-in component",
                    entry.directive
                );
            }
            registry.register(entry.directive.as_str(), ClassComponent::new(entry.class.as_str()));
        }
        registry
    }

    /// Registers a component, replacing any earlier one with the same name.
    pub fn register<C>(&mut self, name: impl Into<String>, component: C) -> &mut Self
    where
        C: Component + 'static,
    {
        self.components.insert(name.into(), Box::new(component));
        self
    }

    /// Looks up the component for a directive name.
    pub fn get(&self, name: &str) -> Option<&dyn Component> {
        self.components.get(name).map(|c| c.as_ref())
    }

    /// True when `name` has a component.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}
