//! Review-step preview via pdf.js

use docedit_core::review::{PreviewSource, NOTE_MAYBE_PROTECTED, PREVIEW_UNAVAILABLE};
use docedit_core::EditorSettings;
use js_sys::Uint8Array;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[wasm_bindgen(module = "/www/js/pdf-bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = loadDocument, catch)]
    async fn load_document_internal(source: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = renderFirstPage, catch)]
    async fn render_first_page_internal(
        document: JsValue,
        canvas: &HtmlCanvasElement,
        scale: f64,
    ) -> Result<JsValue, JsValue>;
}

const PLACEHOLDER_FILL: &str = "#f3f4f6";
const PLACEHOLDER_TEXT: &str = "#6b7280";
const PLACEHOLDER_FONT: &str = "16px Arial";

/// Render page 1 of in-memory PDF bytes
pub async fn render_bytes(
    bytes: &[u8],
    canvas: &HtmlCanvasElement,
    scale: f64,
) -> Result<(), JsValue> {
    let data = Uint8Array::new_with_length(bytes.len() as u32);
    data.copy_from(bytes);
    let document = load_document_internal(data.into()).await?;
    render_first_page_internal(document, canvas, scale).await?;
    Ok(())
}

/// Fetch a PDF by URL and render page 1
pub async fn render_url(url: &str, canvas: &HtmlCanvasElement, scale: f64) -> Result<(), JsValue> {
    let document = load_document_internal(JsValue::from_str(url)).await?;
    render_first_page_internal(document, canvas, scale).await?;
    Ok(())
}

/// Text lines of the placeholder graphic as `(text, x, y)`
pub fn placeholder_lines<'a>(
    width: u32,
    height: u32,
    caption: &'a str,
    note: Option<&'a str>,
) -> Vec<(&'a str, f64, f64)> {
    let x = f64::from(width) / 2.0;
    let y = f64::from(height) / 2.0;
    let mut lines = vec![(caption, x, y - 10.0)];
    if let Some(note) = note {
        lines.push((note, x, y + 15.0));
    }
    lines
}

pub fn draw_placeholder(
    canvas: &HtmlCanvasElement,
    settings: &EditorSettings,
    caption: &str,
    note: Option<&str>,
) -> Result<(), JsValue> {
    let (width, height) = (settings.placeholder_width, settings.placeholder_height);
    canvas.set_width(width);
    canvas.set_height(height);

    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    context.set_fill_style_str(PLACEHOLDER_FILL);
    context.fill_rect(0.0, 0.0, f64::from(width), f64::from(height));
    context.set_fill_style_str(PLACEHOLDER_TEXT);
    context.set_font(PLACEHOLDER_FONT);
    context.set_text_align("center");
    for (text, x, y) in placeholder_lines(width, height, caption, note) {
        context.fill_text(text, x, y)?;
    }
    Ok(())
}

/// Draw whatever the review step selected as its preview
pub async fn show_preview(
    source: &PreviewSource,
    replacement_bytes: Option<&[u8]>,
    canvas: &HtmlCanvasElement,
    settings: &EditorSettings,
) -> Result<(), JsValue> {
    match source {
        PreviewSource::Replacement { scale, .. } => {
            let Some(bytes) = replacement_bytes else {
                return draw_placeholder(canvas, settings, PREVIEW_UNAVAILABLE, None);
            };
            match render_bytes(bytes, canvas, *scale).await {
                Ok(()) => info!("New PDF preview rendered"),
                Err(e) => warn!(error = ?e, "Error rendering PDF preview"),
            }
            Ok(())
        }
        PreviewSource::Original { url, scale } => match render_url(url, canvas, *scale).await {
            Ok(()) => {
                info!(%url, "Original PDF preview rendered");
                Ok(())
            }
            Err(e) => {
                warn!(%url, error = ?e, "Error loading PDF preview");
                draw_placeholder(
                    canvas,
                    settings,
                    PREVIEW_UNAVAILABLE,
                    Some(NOTE_MAYBE_PROTECTED),
                )
            }
        },
        PreviewSource::Placeholder { caption, note } => {
            draw_placeholder(canvas, settings, caption, *note)
        }
    }
}
