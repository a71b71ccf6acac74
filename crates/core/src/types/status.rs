//! Status enums for persisted entities.

use serde::{Deserialize, Serialize};

/// Triage status of a contact submission.
///
/// Any status is settable from any other - there is no enforced state
/// machine; "archived" submissions can be reopened by setting "new".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "submission_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Freshly submitted, not yet handled.
    #[default]
    New,
    /// An admin has looked at it.
    Read,
    /// Closed out, kept for the record.
    Archived,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Read => write!(f, "read"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "read" => Ok(Self::Read),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid submission status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_new() {
        assert_eq!(SubmissionStatus::default(), SubmissionStatus::New);
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in [
            SubmissionStatus::New,
            SubmissionStatus::Read,
            SubmissionStatus::Archived,
        ] {
            let parsed: SubmissionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("deleted".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SubmissionStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");
    }
}
