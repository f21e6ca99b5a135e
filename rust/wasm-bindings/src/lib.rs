// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planesolve WebAssembly Bindings
//!
//! JavaScript/TypeScript API for planesolve built with
//! [wasm-bindgen](https://docs.rs/wasm-bindgen).
//!
//! ## Overview
//!
//! This crate exposes the planesolve kernel to a browser host: entity
//! construction, constraint solving, intersection synthesis, and the
//! expression language. Rendering, hit-testing and tool behavior stay on
//! the JavaScript side; the kernel only stores the UI-facing fields the
//! host asks it to.
//!
//! ## JavaScript Usage
//!
//! ```javascript
//! import init, { SketchApi, version } from 'planesolve-wasm';
//!
//! // Initialize WASM
//! await init();
//!
//! // Build a document
//! const api = new SketchApi();
//! const a = api.addPoint(0, 0);
//! const b = api.addPoint(10, 0);
//! const seg = api.addSegmentTwoPoints(a, b);
//!
//! // Constrain and solve
//! const p = api.addPoint(5, 5);
//! api.setFloating(p, true);
//! api.addPointOnSegmentConstraint(p, seg);
//!
//! const report = api.solve();
//! console.log(`Solved in ${report.iterations} iterations`);
//! console.log(`Version: ${version()}`);
//! ```
//!
//! ## Failure Reporting
//!
//! Constructors return `null` on a missing referent and constraint methods
//! return `null` when the trial solve rejects the constraint; each failure
//! is also logged as a console warning.

use wasm_bindgen::prelude::*;

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

mod api;
mod utils;

pub use api::SketchApi;
pub use utils::set_panic_hook as init_panic_hook;

/// Initialize the WASM module.
///
/// This function is called automatically when the WASM module is loaded.
/// It sets up panic hooks for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the version of planesolve.
///
/// # Returns
///
/// Version string (e.g., "0.1.0")
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
