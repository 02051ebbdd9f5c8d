use serde::Serialize;
use slidemark_core::range::{MetaSpec, RunKind, segment_steps};
use slidemark_deck::{RenderOptions, render_document};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Config
// ============================================================================

fn parse_options(config: JsValue) -> Result<RenderOptions, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))
}

// ============================================================================
// Render API
// ============================================================================

/// Renders a slide document.
///
/// Returns `{ tree, html, diagnostics }`. Authoring errors (an undefined
/// `var`, a missing `id`, an unknown line in a range spec) are thrown.
#[wasm_bindgen]
pub fn render(source: &str, config: JsValue) -> Result<JsValue, JsError> {
    let options = parse_options(config)?;
    let rendered = render_document(source, &options).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&rendered)
}

// Property maps become plain objects rather than `Map`s.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

// ============================================================================
// Stepped highlighting API
// ============================================================================

/// One run of a highlight step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRun {
    /// `dim` or `highlight`.
    pub kind: RunKind,
    /// Source text of the run.
    pub text: String,
}

/// One disclosure step of a code block.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightStep {
    /// True for every step after the first.
    pub fragment: bool,
    /// Runs covering the whole block in order.
    pub runs: Vec<StepRun>,
}

/// Splits `code` into the steps described by the range spec `meta`.
///
/// The host feeds each run through its own syntax highlighter.
#[wasm_bindgen(js_name = highlightSteps)]
pub fn highlight_steps(code: &str, meta: &str) -> Result<JsValue, JsError> {
    let spec: MetaSpec = meta.parse().map_err(|e: slidemark_core::SlidemarkError| {
        JsError::new(&e.to_string())
    })?;
    let steps = segment_steps(code, &spec).map_err(|e| JsError::new(&e.to_string()))?;

    let steps: Vec<HighlightStep> = steps
        .into_iter()
        .enumerate()
        .map(|(index, runs)| HighlightStep {
            fragment: index > 0,
            runs: runs
                .iter()
                .map(|run| StepRun {
                    kind: run.kind,
                    text: run.text(code).to_string(),
                })
                .collect(),
        })
        .collect();

    to_js(&steps)
}
