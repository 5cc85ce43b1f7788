//! Browser shell for the edit-document page
//!
//! The server renders the form; this module mounts an
//! [`EditDocumentController`](docedit_core::EditDocumentController) on it and
//! keeps the page in sync with the controller's view models.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { mount } from './pkg/docedit_wasm.js';
//!
//! await init();
//! mount({
//!     documentId: 42,
//!     originalFileName: 'manual.pdf',
//!     existingTags: 'iso,draft',
//!     publishDate: '2021-03-01',
//!     availableTags: ['iso', 'draft', 'ansi'],
//!     availableClassifications: ['Internal'],
//! });
//! ```

pub mod app;
pub mod dom;
pub mod logging;
pub mod pdf_viewer;

use docedit_core::EditorConfig;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Attach the editor to the rendered page
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<(), JsValue> {
    let config: EditorConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {}", e)))?;
    app::mount(config)
}

/// Current page view model, for debugging from the console
#[wasm_bindgen(js_name = pageState)]
pub fn page_state() -> Result<JsValue, JsValue> {
    let view = app::with_app(|app| app.page_view())
        .ok_or_else(|| JsValue::from_str("Edit page is not mounted"))?;
    serde_wasm_bindgen::to_value(&view)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Page count of PDF bytes; `None` when they cannot be parsed
#[wasm_bindgen(js_name = getPageCount)]
pub fn get_page_count(bytes: &[u8]) -> Option<u32> {
    docedit_core::get_page_count(bytes)
}
