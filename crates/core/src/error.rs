use serde::Serialize;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that abort a render.
///
/// Authoring mistakes are fatal: a half-rendered deck is never returned.
#[derive(Debug, Error)]
pub enum SlidemarkError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// A component needed an attribute the directive did not declare.
    #[error("{directive} needs an {attribute}")]
    MissingRequiredAttribute {
        /// Directive name
        directive: String,
        /// Missing attribute name
        attribute: String,
    },
    /// `var` referenced an id that no earlier `define-var` stored.
    #[error("var with id '{id}' is not defined")]
    UndefinedVariableReference {
        /// Variable id
        id: String,
    },
    /// A range cursor named a line the code block does not have.
    #[error("unknown line {line}")]
    UnknownLineReference {
        /// Line number as written (1-indexed)
        line: usize,
    },
    /// A range cursor that is not `line` or `line:column`.
    #[error("invalid range cursor '{cursor}'")]
    InvalidRangeCursor {
        /// Offending cursor text
        cursor: String,
    },
    /// A directive kind outside inline/leaf/container.
    #[error("unhandled directive kind '{kind}'")]
    UnhandledDirectiveKind {
        /// Kind as received
        kind: String,
    },
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result alias used across slidemark.
pub type SlidemarkResult<T> = Result<T, SlidemarkError>;

impl SlidemarkError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::MarkdownAdapter {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a missing attribute error
    pub fn missing_attribute(directive: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            directive: directive.into(),
            attribute: attribute.into(),
        }
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParseWarning {
    /// Code fence opened but never closed
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
    /// Container directive still open at end of input; closed implicitly
    UnclosedDirective {
        /// Source location of the opening line
        location: SourceLocation,
        /// Directive name
        name: String,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. } => location,
            ParseWarning::UnclosedDirective { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(f, "Unclosed code fence ({}): {}", marker, location)
            }
            ParseWarning::UnclosedDirective { location, name } => {
                write!(f, "Unclosed directive '{}': {}", name, location)
            }
        }
    }
}

/// Collection of parse diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
