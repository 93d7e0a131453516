//! Error conversion for the JS boundary.

use fba_core::error::FbaError;
use wasm_bindgen::JsValue;

/// Convert core results into JS results carrying a serializable error
/// (`{ kind, message }`).
pub(crate) trait IntoJsResult<T> {
    /// Map the error side into a `JsValue`.
    fn js_err(self) -> Result<T, JsValue>;
}

impl<T> IntoJsResult<T> for Result<T, FbaError> {
    fn js_err(self) -> Result<T, JsValue> {
        self.map_err(|err| {
            serde_wasm_bindgen::to_value(&err.to_serializable())
                .unwrap_or_else(|_| JsValue::from_str(&err.to_string()))
        })
    }
}

/// Describe a JS error value for core error messages.
pub(crate) fn js_error_message(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| {
        js_sys::JSON::stringify(&err)
            .ok()
            .and_then(|s| s.as_string())
            .unwrap_or_else(|| "unknown JS error".to_string())
    })
}
