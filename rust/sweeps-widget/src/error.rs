use sweeps_protocol::{codes, WidgetError};
use thiserror::Error;

/// The common error type used by this crate.
///
/// Submission failures have their own type (`submit::SubmitError`) since
/// they surface to the visitor instead of the loader.
#[derive(Error, Debug, PartialEq)]
pub enum SweepsWidgetError {
    /// A prerequisite was missing or malformed; never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A DOM operation failed (element creation, attribute access, ...).
    #[error("DOM operation failed: {0}")]
    Dom(String),

    /// Something went wrong inside the embed document.
    #[error("Embed error: {0}")]
    Embed(String),

    /// A protocol payload could not be produced.
    #[error("Could not encode message: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for SweepsWidgetError {
    fn from(value: serde_json::Error) -> Self {
        SweepsWidgetError::Encoding(format!("{value}"))
    }
}

impl From<SweepsWidgetError> for WidgetError {
    fn from(value: SweepsWidgetError) -> Self {
        let code = match &value {
            SweepsWidgetError::Configuration(_) => codes::CONFIGURATION_ERROR,
            SweepsWidgetError::Dom(_) | SweepsWidgetError::Embed(_) => codes::RENDER_ERROR,
            SweepsWidgetError::Encoding(_) => codes::GLOBAL_ERROR,
        };
        WidgetError::new(code, value.to_string())
    }
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
mod wasm {
    use super::SweepsWidgetError;
    use wasm_bindgen::JsValue;

    /// Render an opaque JS exception value into an error string.
    pub fn js_value_to_string(value: JsValue) -> String {
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"))
    }

    impl From<JsValue> for SweepsWidgetError {
        fn from(value: JsValue) -> Self {
            SweepsWidgetError::Dom(js_value_to_string(value))
        }
    }

    impl From<SweepsWidgetError> for JsValue {
        fn from(value: SweepsWidgetError) -> Self {
            format!("{value}").into()
        }
    }
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub use wasm::js_value_to_string;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_error_codes_follow_the_taxonomy() {
        let wire: WidgetError =
            SweepsWidgetError::Configuration("missing data-sweepstakes-id".into()).into();
        assert_eq!(wire.code, codes::CONFIGURATION_ERROR);

        let wire: WidgetError = SweepsWidgetError::Embed("mount point missing".into()).into();
        assert_eq!(wire.code, codes::RENDER_ERROR);

        let wire: WidgetError = SweepsWidgetError::Encoding("bad payload".into()).into();
        assert_eq!(wire.code, codes::GLOBAL_ERROR);
    }
}
