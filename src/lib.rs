//! Screenplay Editor WASM Module
//!
//! This is the main WASM module for the screenplay editor. It owns the
//! tagged-line document model and the position-mapping engine that keeps the
//! persisted content, the visible textarea content, and collaborator cursors
//! in agreement.

pub mod models;
pub mod tags;
pub mod reconcile;
pub mod projection;
pub mod buffer;
pub mod api;

// Re-export commonly used types
pub use models::document::*;
pub use models::caret::*;
pub use models::remote::*;
pub use buffer::EditBuffer;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Screenplay Editor WASM module initialized");
}
