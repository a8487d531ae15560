//! WebAssembly bindings for the powtoy playground.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Hashing free text (hex and Base64)
//! - Hashing a block candidate built from form fields
//! - Mining, either blocking or in JS-driven batches that can be stopped

use wasm_bindgen::prelude::*;

pub mod api;
pub mod miner;
pub mod state;

// Re-export main types for JS access
pub use miner::Miner;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
