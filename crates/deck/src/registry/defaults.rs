//! Default registry for slide decks.

use super::{ClassComponent, ComponentRegistry};
use crate::components;

/// Directives that only add a class, with the class they add.
pub const DEFAULT_CLASS_DIRECTIVES: &[(&str, &str)] = &[
    ("columns", "columns"),
    ("column", "column"),
    ("keyword", "keyword"),
    ("note", "note"),
    ("left", "left"),
    ("center", "center"),
    ("right", "right"),
    ("green", "green"),
    ("red", "red"),
];

/// Creates the registry with every built-in slide component.
///
/// # Example
///
/// ```
/// use slidemark_deck::registry::defaults::default_slide_registry;
///
/// let registry = default_slide_registry();
/// assert!(registry.contains("slide"));
/// assert!(registry.contains("define-var"));
/// ```
pub fn default_slide_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register("quote", components::quote)
        .register("slide", components::slide)
        .register("fragment", components::fragment)
        .register("speaker", components::speaker)
        .register("mermaid", components::mermaid)
        .register("shell", components::shell)
        .register("define-var", components::define_var)
        .register("var", components::var);

    for (directive, class) in DEFAULT_CLASS_DIRECTIVES {
        registry.register(*directive, ClassComponent::new(*class));
    }

    registry
}

/// Names handled by [`default_slide_registry`], sorted.
pub fn default_directive_names() -> Vec<&'static str> {
    let mut names = vec![
        "quote",
        "slide",
        "fragment",
        "speaker",
        "mermaid",
        "shell",
        "define-var",
        "var",
    ];
    names.extend(DEFAULT_CLASS_DIRECTIVES.iter().map(|(directive, _)| *directive));
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_every_builtin() {
        let registry = default_slide_registry();
        assert_eq!(registry.names(), default_directive_names());
        assert_eq!(registry.len(), 17);
    }

    #[test]
    fn unknown_names_are_absent() {
        assert!(!default_slide_registry().contains("unknown"));
    }
}
