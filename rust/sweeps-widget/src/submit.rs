//! Entry submission against the backing store.
//!
//! The client validates the entry, POSTs it to the store's REST endpoint,
//! and reports a typed outcome: validation failures go back to the form
//! field they belong to, store and network failures surface as a retryable
//! message. Submission is user-initiated, so nothing here escalates to the
//! loader's retry machinery and nothing resubmits automatically — the
//! visitor does.

use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use sweeps_protocol::{EntryRecord, EntryValidationError, Environment};
use thiserror::Error;

use crate::error::js_value_to_string;
use crate::logger::Logger;

const LOG: Logger = Logger::new("sweeps:submit");

/// Why an entry did not make it into the store.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The entry failed a submission rule; the display text is the
    /// user-facing copy for the offending field.
    #[error("{0}")]
    Invalid(#[from] EntryValidationError),

    /// The store answered with a non-success status.
    #[error("the store rejected the entry (status {status})")]
    Store {
        /// HTTP status returned by the store.
        status: u16,
    },

    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),
}

/// What the store reports back for an accepted entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    /// Campaign-configured tracking URL to forward the visitor to.
    #[serde(default)]
    pub tracking_url: Option<String>,
    /// Whether this campaign is opted into the external email-list sync.
    #[serde(default)]
    pub list_sync: bool,
}

/// POSTs entries (and optional list-sync forwards) for one environment.
pub struct SubmissionClient {
    environment: Environment,
}

impl SubmissionClient {
    /// A client for the given backend environment.
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Validate and store one entry.
    pub async fn submit(&self, entry: &EntryRecord) -> Result<SubmitReceipt, SubmitError> {
        entry.validate()?;

        let body = serde_json::to_string(entry)
            .map_err(|error| SubmitError::Network(format!("could not encode entry: {error}")))?;
        let response = post_json(&self.environment.entries_endpoint(), &body).await?;
        if !response.ok() {
            return Err(SubmitError::Store {
                status: response.status(),
            });
        }

        // The receipt body is advisory; an empty or unparsable body is a
        // plain acceptance with no redirect and no list sync.
        Ok(read_receipt(&response).await)
    }

    /// Forward an opted-in entrant to the external email-list sync.
    ///
    /// Best-effort: the entry is already stored when this runs, so failures
    /// are logged rather than surfaced to the visitor.
    pub async fn sync_mailing_list(&self, entry: &EntryRecord) {
        let payload = serde_json::json!({
            "sweepstakesId": entry.sweepstakes_id,
            "email": entry.email,
            "name": entry.name,
        });
        let result = post_json(
            &self.environment.list_sync_endpoint(),
            &payload.to_string(),
        )
        .await;
        match result {
            Ok(response) if response.ok() => {}
            Ok(response) => LOG.warn(&format!("list sync returned status {}", response.status())),
            Err(error) => LOG.warn(&format!("list sync failed: {error}")),
        }
    }

    /// Client-side redirect to a campaign tracking URL.
    pub fn redirect_to(&self, url: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(error) = window.location().set_href(url) {
                LOG.warn(&format!(
                    "redirect to {url} failed: {}",
                    js_value_to_string(error)
                ));
            }
        }
    }
}

async fn post_json(url: &str, body: &str) -> Result<Response, SubmitError> {
    let network = |error: JsValue| SubmitError::Network(js_value_to_string(error));

    let headers = Headers::new().map_err(network)?;
    headers.set("Content-Type", "application/json").map_err(network)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &init).map_err(network)?;
    let window = web_sys::window().ok_or_else(|| SubmitError::Network("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network)?
        .unchecked_into();
    Ok(response)
}

async fn read_receipt(response: &Response) -> SubmitReceipt {
    let Ok(text_promise) = response.text() else {
        return SubmitReceipt::default();
    };
    let Ok(body) = JsFuture::from(text_promise).await else {
        return SubmitReceipt::default();
    };
    body.as_string()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}
