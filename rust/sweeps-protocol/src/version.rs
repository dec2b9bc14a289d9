use serde::{Deserialize, Serialize};

/// One row of the external deploy tool's version table.
///
/// The deploy operation atomically marks exactly one row as active and
/// stores a content hash of the published bundle. The widget does not deploy
/// anything; this shape exists so callers can validate what is currently
/// being served against what they expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedVersion {
    /// Version tag of the bundle, e.g. `"2.4.1"`.
    pub version: String,
    /// Hex digest of the published bundle contents.
    pub content_hash: String,
    /// Whether this row is the one currently served.
    pub active: bool,
}

impl DeployedVersion {
    /// Whether a locally computed digest matches the published one.
    ///
    /// Comparison is case-insensitive since hex digests show up in both
    /// casings depending on the tool that produced them.
    pub fn matches_hash(&self, digest: &str) -> bool {
        self.content_hash.eq_ignore_ascii_case(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_comparison_ignores_case() {
        let row: DeployedVersion = serde_json::from_str(
            r#"{ "version": "2.4.1", "contentHash": "AB12CD", "active": true }"#,
        )
        .unwrap();
        assert!(row.matches_hash("ab12cd"));
        assert!(!row.matches_hash("ab12ce"));
    }
}
