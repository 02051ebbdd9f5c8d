//! Document pipeline: markdown in, content tree and HTML out.

/// Per-render state.
pub mod context;
/// mdast to content tree conversion.
pub mod convert;
/// Directive dispatch.
pub mod dispatch;

pub use context::RenderContext;
pub use convert::{ConvertOptions, mdast_to_content};
pub use dispatch::{Parent, dispatch};

use crate::highlight::{Highlighter, PlainHighlighter, highlight_code_blocks};
use crate::html::to_html;
use crate::registry::{ComponentRegistry, RegistryConfig};
use serde::{Deserialize, Serialize};
use slidemark_core::{ParseDiagnostics, ParseOptions, Root, SlidemarkResult, classify, parse_document};

/// Options for [`render_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Whether directive syntax is recognised.
    pub enable_directives: bool,
    /// Whether `*` bullets reveal one by one.
    pub fragment_list_items: bool,
    /// Whether code blocks go through the highlighter (and range steps).
    pub highlight_code: bool,
    /// Whether GitHub Flavored Markdown constructs are parsed.
    pub gfm: bool,
    /// Extra components.
    pub registry: RegistryConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_directives: true,
            fragment_list_items: true,
            highlight_code: true,
            gfm: true,
            registry: RegistryConfig::default(),
        }
    }
}

impl RenderOptions {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: self.gfm,
            directives: self.enable_directives,
        }
    }
}

/// Result of rendering one document.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    /// Final content tree.
    pub tree: Root,
    /// Serialized HTML.
    pub html: String,
    /// Non-fatal findings.
    pub diagnostics: ParseDiagnostics,
}

/// Renders markdown with the plain highlighter.
pub fn render_document(markdown: &str, options: &RenderOptions) -> SlidemarkResult<RenderedDocument> {
    render_document_with(markdown, options, &PlainHighlighter)
}

/// Renders markdown, passing code runs through `highlighter`.
///
/// Every call gets a fresh [`RenderContext`]; shells and variables never
/// leak from one document into the next.
pub fn render_document_with(
    markdown: &str,
    options: &RenderOptions,
    highlighter: &dyn Highlighter,
) -> SlidemarkResult<RenderedDocument> {
    let parsed = parse_document(markdown, &options.parse_options())?;
    for warning in &parsed.diagnostics.warnings {
        log::warn!("{}", warning);
    }

    let converted = mdast_to_content(
        &parsed.mdast,
        &parsed.source,
        &ConvertOptions {
            fragment_list_items: options.fragment_list_items,
        },
    );
    let classified = classify(converted, &parsed.directives)?;

    let registry = ComponentRegistry::from_config(&options.registry);
    let mut context = RenderContext::new();
    let mut tree = dispatch(classified, &registry, &mut context)?;

    if options.highlight_code {
        highlight_code_blocks(&mut tree, highlighter)?;
    }

    let html = to_html(&tree);
    Ok(RenderedDocument {
        tree,
        html,
        diagnostics: parsed.diagnostics,
    })
}
