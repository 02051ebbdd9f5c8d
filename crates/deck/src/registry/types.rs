//! Registry configuration passed in by hosts.

use serde::{Deserialize, Serialize};

/// Configuration for the component registry passed from JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Extra class-adding directives registered on top of the built-ins.
    #[serde(default)]
    pub class_directives: Vec<ClassDirective>,
}

/// A directive that renders as a block-or-inline wrapper with a fixed class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassDirective {
    /// Directive name (e.g., "warning", "muted").
    pub directive: String,
    /// Class added to the wrapper.
    pub class: String,
}

impl RegistryConfig {
    /// Adds a class directive, replacing an earlier entry for the same name.
    pub fn with_class_directive(
        mut self,
        directive: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        let directive = directive.into();
        self.class_directives.retain(|d| d.directive != directive);
        self.class_directives.push(ClassDirective {
            directive,
            class: class.into(),
        });
        self
    }

    /// Get the class configured for a directive.
    #[cfg(test)]
    pub(crate) fn get_directive_class(&self, directive: &str) -> Option<&str> {
        self.class_directives
            .iter()
            .find(|d| d.directive == directive)
            .map(|d| d.class.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case() {
        let config: RegistryConfig = serde_json::from_str(
            r#"{"classDirectives":[{"directive":"muted","class":"text-muted"}]}"#,
        )
        .unwrap();
        assert_eq!(config.get_directive_class("muted"), Some("text-muted"));
        assert_eq!(config.get_directive_class("other"), None);
    }

    #[test]
    fn missing_fields_default() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert!(config.class_directives.is_empty());
    }

    #[test]
    fn later_entry_replaces_earlier() {
        let config = RegistryConfig::default()
            .with_class_directive("muted", "a")
            .with_class_directive("muted", "b");
        assert_eq!(config.class_directives.len(), 1);
        assert_eq!(config.get_directive_class("muted"), Some("b"));
    }
}
