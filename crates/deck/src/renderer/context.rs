//! Per-render state shared by every component call.

use slidemark_core::ContentNode;
use std::collections::HashMap;

/// Mutable state for one document render.
///
/// Created empty at the start of a render and dropped at the end. Only
/// `shell` and `define-var` write to it; `slide` and `var` read it.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    variables: HashMap<String, Vec<ContentNode>>,
    shell: Vec<ContentNode>,
}

impl RenderContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current slide shell.
    pub fn shell(&self) -> &[ContentNode] {
        &self.shell
    }

    /// Replaces the slide shell.
    pub fn set_shell(&mut self, children: Vec<ContentNode>) {
        self.shell = children;
    }

    /// Stores a variable, replacing any earlier definition.
    pub fn define_variable(&mut self, id: impl Into<String>, children: Vec<ContentNode>) {
        self.variables.insert(id.into(), children);
    }

    /// Looks up a variable defined earlier in document order.
    pub fn variable(&self, id: &str) -> Option<&[ContentNode]> {
        self.variables.get(id).map(Vec::as_slice)
    }
}
