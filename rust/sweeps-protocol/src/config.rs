use serde::{Deserialize, Serialize};
use url::Url;

/// Hosted embed document and storage endpoints for production.
const PRODUCTION_EMBED_BASE: &str = "https://embed.sweepswidget.io";
const PRODUCTION_STORAGE_BASE: &str = "https://api.sweepswidget.io";

/// Local development endpoints (embed dev server and local storage stack).
const DEVELOPMENT_EMBED_BASE: &str = "http://localhost:8080";
const DEVELOPMENT_STORAGE_BASE: &str = "http://localhost:54321";

/// Bundle version requested when the config does not pin one.
pub const DEFAULT_WIDGET_VERSION: &str = "latest";

/// Which hosted backend the widget talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development servers.
    Development,
    /// The hosted production deployment.
    #[default]
    Production,
}

impl Environment {
    /// Base URL the embed document is served from.
    pub fn embed_base(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_EMBED_BASE,
            Environment::Production => PRODUCTION_EMBED_BASE,
        }
    }

    /// Base URL of the backing store's REST surface.
    pub fn storage_base(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_STORAGE_BASE,
            Environment::Production => PRODUCTION_STORAGE_BASE,
        }
    }

    /// The origin messages from the embed document must carry, and the
    /// target origin for parent → iframe posts.
    pub fn embed_origin(&self) -> String {
        match Url::parse(self.embed_base()) {
            Ok(url) => url.origin().ascii_serialization(),
            // The bases above are compile-time constants; this arm is
            // unreachable unless they are edited into something unparsable.
            Err(_) => self.embed_base().to_string(),
        }
    }

    /// Endpoint entries are POSTed to.
    pub fn entries_endpoint(&self) -> String {
        format!("{}/rest/v1/entries", self.storage_base())
    }

    /// Serverless function that forwards opted-in entrants to the external
    /// email-list sync.
    pub fn list_sync_endpoint(&self) -> String {
        format!("{}/functions/v1/list-sync", self.storage_base())
    }

    /// Stylesheet injected into the host page by the entry script.
    pub fn stylesheet_url(&self) -> String {
        format!("{}/widget.css", self.embed_base())
    }

    /// UI runtime scripts the host entry script loads, in order. Later
    /// scripts assume the globals installed by earlier ones, so they must be
    /// loaded sequentially.
    pub fn runtime_urls(&self) -> [String; 2] {
        [
            format!("{}/vendor/runtime.js", self.embed_base()),
            format!("{}/vendor/dom.js", self.embed_base()),
        ]
    }
}

/// Immutable configuration for one mounted widget instance.
///
/// Created by the host entry script from the placeholder element's data
/// attributes, consumed by the loader, and forwarded into the embed document
/// through the `INITIALIZE_WIDGET` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// DOM id of the container the iframe is appended to.
    pub container_id: String,
    /// The campaign to render.
    pub sweepstakes_id: String,
    /// Bundle version to request; defaults to [`DEFAULT_WIDGET_VERSION`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Backend selection; defaults to production.
    #[serde(default)]
    pub environment: Environment,
}

impl WidgetConfig {
    /// Configuration for a campaign with default version and environment.
    pub fn new(container_id: impl Into<String>, sweepstakes_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            sweepstakes_id: sweepstakes_id.into(),
            version: None,
            environment: Environment::default(),
        }
    }

    /// The bundle version this instance requests.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_WIDGET_VERSION)
    }

    /// Build the iframe `src` for one (re)creation of the embed document.
    ///
    /// `timestamp` is a cache buster: every teardown-and-recreate cycle must
    /// fetch a fresh document rather than a stale cached one. `parent_origin`
    /// is carried as a query parameter so the embed document can pin its
    /// replies to the host page's origin instead of posting to `*`.
    pub fn embed_src(&self, timestamp: u64, parent_origin: &str) -> String {
        let base = format!("{}/embed.html", self.environment.embed_base());
        match Url::parse(&base) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("v", self.version())
                    .append_pair("t", &timestamp.to_string())
                    .append_pair("o", parent_origin);
                url.into()
            }
            Err(_) => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_src_carries_version_timestamp_and_origin() {
        let config = WidgetConfig::new("sweeps-widget-container", "abc-123");
        let src = config.embed_src(1700000000, "https://contest.example");
        assert!(src.starts_with("https://embed.sweepswidget.io/embed.html?"));
        assert!(src.contains("v=latest"));
        assert!(src.contains("t=1700000000"));
        assert!(src.contains("o=https%3A%2F%2Fcontest.example"));
    }

    #[test]
    fn pinned_version_overrides_the_default() {
        let config = WidgetConfig {
            version: Some("2.4.1".into()),
            ..WidgetConfig::new("c", "s")
        };
        assert!(config.embed_src(1, "null").contains("v=2.4.1"));
    }

    #[test]
    fn development_endpoints_derive_from_the_local_base() {
        assert_eq!(
            Environment::Development.entries_endpoint(),
            "http://localhost:54321/rest/v1/entries"
        );
        assert_eq!(
            Environment::Development.embed_origin(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn environment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Environment::Development).unwrap(),
            "\"development\""
        );
        let config: WidgetConfig =
            serde_json::from_str(r#"{ "containerId": "c", "sweepstakesId": "s" }"#).unwrap();
        assert_eq!(config.environment, Environment::Production);
    }
}
