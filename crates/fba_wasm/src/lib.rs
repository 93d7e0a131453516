//! WebAssembly bindings for the FBA admin/editing core.
//!
//! This crate exposes the editing model to the browser frontend: a
//! JavaScript-backed gateway ([`js_gateway::JsGateway`]), the exported admin
//! API ([`admin`]), and event subscriptions for toast-style notices.
//!
//! The controller is a thread-local single-operator value; async entry
//! points take it for the duration of one operation, so overlapping admin
//! calls fail fast with "another admin operation is in flight" instead of
//! interleaving half-applied state.
//!
//! The bindings only exist on `wasm32` - the JavaScript handles they hold
//! are not `Send`, so on native targets this crate compiles to an empty
//! stub and the native host uses `fba_gateway` instead.

#[cfg(target_arch = "wasm32")]
pub mod admin;
#[cfg(target_arch = "wasm32")]
mod error;
#[cfg(target_arch = "wasm32")]
pub mod js_gateway;

#[cfg(all(target_arch = "wasm32", feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the WASM module. Called automatically on module load.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    let _ = console_log::init_with_level(log::Level::Info);
}
