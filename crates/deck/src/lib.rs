#![deny(missing_docs)]
//! Slidemark deck engine: directive components, the render pipeline, stepped
//! code highlighting, and HTML output.

/// Built-in slide components.
pub mod components;
/// Stepped code highlighting over content trees.
pub mod highlight;
/// HTML stringification.
pub mod html;
/// Component registry and registry configuration.
pub mod registry;
/// Document pipeline: conversion, dispatch, and render context.
pub mod renderer;

pub use highlight::{Highlighter, PlainHighlighter, highlight_code_blocks, segment_block};
pub use html::to_html;
pub use registry::{ClassComponent, ClassDirective, Component, ComponentRegistry, RegistryConfig};
pub use renderer::{
    Parent, RenderContext, RenderOptions, RenderedDocument, dispatch, render_document,
    render_document_with,
};
