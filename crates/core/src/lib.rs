#![deny(missing_docs)]
//! Slidemark core: the content tree, directive syntax front-end, markdown
//! parse adapter, directive classifier, and range-spec arithmetic.

/// Directive classification over content trees.
pub mod classify;
/// Code fence detection utilities.
pub mod code_fence;
/// Directive syntax preprocessing.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// Markdown parsing with directive markers.
pub mod parse;
/// Range specs and offset arithmetic for stepped highlighting.
pub mod range;
/// Content tree model.
pub mod tree;

pub use error::{ParseDiagnostics, ParseWarning, SlidemarkError, SlidemarkResult, SourceLocation};
pub use parse::{ParseOptions, ParsedDocument, parse_document, parse_mdast};
pub use tree::{
    ContentNode, DirectiveKind, DirectiveNode, Element, Properties, PropertyValue, Root, Text,
    merge_properties,
};

pub use classify::{classify, classify_node};
pub use code_fence::{FenceTracker, OpenFence};
pub use directives::{
    DIRECTIVE_MARKER_TAG, DirectiveOpening, DirectiveTable, Preprocessed, parse_attributes,
    preprocess_directives,
};
pub use range::{
    Cursor, LineTable, MetaSpec, Range, Run, RunKind, Step, overlapping_ranges, segment,
    segment_steps,
};
