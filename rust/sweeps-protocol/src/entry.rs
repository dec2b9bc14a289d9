use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reason an [`EntryRecord`] failed validation.
///
/// These surface directly to the visitor next to the offending field, so the
/// display strings are user-facing copy rather than diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// No campaign id was attached to the entry.
    #[error("This form is not connected to a sweepstakes")]
    MissingSweepstakes,

    /// The name field was empty or whitespace.
    #[error("Please enter your name")]
    NameRequired,

    /// The email field did not look like a deliverable address.
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// The consent box was not checked.
    #[error("You must agree to the official rules to enter")]
    ConsentRequired,
}

impl EntryValidationError {
    /// The form field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            EntryValidationError::MissingSweepstakes => "sweepstakes",
            EntryValidationError::NameRequired => "name",
            EntryValidationError::InvalidEmail => "email",
            EntryValidationError::ConsentRequired => "consent",
        }
    }
}

/// A visitor's sweepstakes entry, as submitted to the backing store.
///
/// The widget only constructs and submits this record; storage and winner
/// selection belong to the admin subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    /// The campaign being entered.
    pub sweepstakes_id: String,
    /// Entrant's name.
    pub name: String,
    /// Entrant's email address.
    pub email: String,
    /// Optional demographic field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    /// Optional demographic field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// How the entrant heard about the campaign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_source: Option<String>,
    /// Affirmative agreement to the official rules.
    pub consent: bool,
}

impl EntryRecord {
    /// An entry with only the required fields set.
    pub fn new(
        sweepstakes_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        consent: bool,
    ) -> Self {
        Self {
            sweepstakes_id: sweepstakes_id.into(),
            name: name.into(),
            email: email.into(),
            age_range: None,
            postal_code: None,
            referral_source: None,
            consent,
        }
    }

    /// Check the entry against the submission rules.
    ///
    /// Rules are checked in field order and the first violation is returned;
    /// the form re-validates after each fix, so the visitor sees one message
    /// at a time next to the field it belongs to.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.sweepstakes_id.trim().is_empty() {
            return Err(EntryValidationError::MissingSweepstakes);
        }
        if self.name.trim().is_empty() {
            return Err(EntryValidationError::NameRequired);
        }
        if !looks_like_email(&self.email) {
            return Err(EntryValidationError::InvalidEmail);
        }
        if !self.consent {
            return Err(EntryValidationError::ConsentRequired);
        }
        Ok(())
    }
}

/// Structural email check: one `@`, non-empty local part, and a domain with
/// a dot. Deliverability is the store's problem, not the widget's.
fn looks_like_email(candidate: &str) -> bool {
    let candidate = candidate.trim();
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !candidate.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_entry() -> EntryRecord {
        EntryRecord::new("abc-123", "Robin Doe", "robin@example.com", true)
    }

    #[test]
    fn a_complete_entry_passes() {
        assert_eq!(valid_entry().validate(), Ok(()));
    }

    #[test]
    fn each_rule_rejects_its_own_violation() {
        let mut entry = valid_entry();
        entry.sweepstakes_id = "  ".into();
        assert_eq!(
            entry.validate(),
            Err(EntryValidationError::MissingSweepstakes)
        );

        let mut entry = valid_entry();
        entry.name = "".into();
        assert_eq!(entry.validate(), Err(EntryValidationError::NameRequired));

        let mut entry = valid_entry();
        entry.consent = false;
        assert_eq!(entry.validate(), Err(EntryValidationError::ConsentRequired));
    }

    #[test]
    fn email_shapes() {
        for bad in ["", "plain", "@example.com", "a@", "a@nodot", "a@.com", "a@b.com extra"] {
            let mut entry = valid_entry();
            entry.email = bad.into();
            assert_eq!(
                entry.validate(),
                Err(EntryValidationError::InvalidEmail),
                "expected rejection of {bad:?}"
            );
        }

        let mut entry = valid_entry();
        entry.email = " spaced@mail.example.org ".into();
        assert_eq!(entry.validate(), Ok(()), "surrounding whitespace is trimmed");
    }

    #[test]
    fn optional_fields_are_omitted_from_the_wire() {
        let wire = serde_json::to_value(valid_entry()).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "sweepstakesId": "abc-123",
                "name": "Robin Doe",
                "email": "robin@example.com",
                "consent": true,
            })
        );
    }

    #[test]
    fn validation_errors_name_their_field() {
        assert_eq!(EntryValidationError::InvalidEmail.field(), "email");
        assert_eq!(EntryValidationError::ConsentRequired.field(), "consent");
    }
}
