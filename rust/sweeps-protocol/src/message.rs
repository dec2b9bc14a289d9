use serde::{Deserialize, Serialize};

use crate::WidgetError;

/// A message exchanged between the host page and the embed document.
///
/// The wire form is JSON, internally tagged on `type`:
///
/// | `type`              | direction       | payload                  |
/// |---------------------|-----------------|--------------------------|
/// | `INITIALIZE_WIDGET` | parent → iframe | `{ sweepstakesId }`      |
/// | `WIDGET_READY`      | iframe → parent | `{}`                     |
/// | `WIDGET_ERROR`      | iframe → parent | `{ error }`              |
/// | `WIDGET_WARNING`    | iframe → parent | `{ message }`            |
/// | `WIDGET_INFO`       | iframe → parent | `{ message }`            |
/// | `setHeight`         | iframe → parent | `{ height }`             |
///
/// The union is closed: [`WidgetMessage::decode`] is the only place raw
/// payloads are interpreted, and anything that does not carry a recognized
/// tag decodes to `None` and is dropped by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetMessage {
    /// Command the embed document to render the form for a campaign.
    #[serde(rename = "INITIALIZE_WIDGET")]
    Initialize {
        /// The campaign to render.
        #[serde(rename = "sweepstakesId")]
        sweepstakes_id: String,
    },

    /// First successful render inside the iframe is complete.
    #[serde(rename = "WIDGET_READY")]
    Ready {},

    /// A fatal or recoverable error inside the iframe; drives parent retry.
    #[serde(rename = "WIDGET_ERROR")]
    Error {
        /// The structured error being reported.
        error: WidgetError,
    },

    /// Non-fatal diagnostic.
    #[serde(rename = "WIDGET_WARNING")]
    Warning {
        /// Diagnostic text.
        message: String,
    },

    /// Informational diagnostic.
    #[serde(rename = "WIDGET_INFO")]
    Info {
        /// Diagnostic text.
        message: String,
    },

    /// Requested iframe pixel height, reported by the resize bridge.
    #[serde(rename = "setHeight")]
    SetHeight {
        /// Full scroll height of the embed document, in CSS pixels.
        height: f64,
    },
}

impl WidgetMessage {
    /// Decode a raw JSON payload received over `postMessage`.
    ///
    /// Returns `None` for anything that is not a recognized widget message:
    /// unknown `type` tags, malformed payloads, and unrelated traffic on the
    /// same channel are all ignored rather than treated as errors.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Encode this message to its JSON wire form.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
