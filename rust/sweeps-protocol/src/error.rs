use serde::{Deserialize, Serialize};

/// Well-known error codes carried by [`WidgetError`] on the wire.
///
/// The parent loader only branches on whether an error arrived at all (every
/// error drives the same retry path), so these are plain strings rather than
/// an enum; codes exist for diagnostics and log correlation.
pub mod codes {
    /// A prerequisite was missing (container, sweepstakes id, runtime
    /// global). Configuration errors cannot self-heal and are never retried.
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    /// The embed document had no mount point to render into.
    pub const MOUNT_NOT_FOUND: &str = "MOUNT_NOT_FOUND";
    /// An exception escaped while building the entry form UI.
    pub const RENDER_ERROR: &str = "RENDER_ERROR";
    /// An uncaught exception or failed resource load outside the iframe
    /// boundary, captured by the window-level handler.
    pub const GLOBAL_ERROR: &str = "GLOBAL_ERROR";
}

/// A structured error exchanged over the widget protocol.
///
/// Produced by the embedded bootstrapper (or global error capture) and
/// consumed by the parent loader's retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetError {
    /// Stable machine-readable code, one of [`codes`].
    pub code: String,
    /// Human-readable description for diagnostics.
    pub message: String,
    /// Optional free-form context (stack fragment, offending value, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl WidgetError {
    /// Create an error with a code and message and no details.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach free-form context to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
