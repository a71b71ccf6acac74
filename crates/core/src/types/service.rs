//! Service-interest keys from the contact form.

use serde::{Deserialize, Serialize};

/// The service a contact submission expressed interest in.
///
/// The public form submits an enum-like string key. Known keys map to a
/// human-readable display name; unknown keys are tolerated and displayed
/// verbatim so a form/catalogue mismatch never drops a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceInterest(String);

/// Known service keys and their display names.
const SERVICE_NAMES: &[(&str, &str)] = &[
    ("digitalTransformation", "Digital Transformation"),
    ("dataGovernance", "Data Governance"),
    ("cloudComputing", "Cloud Computing"),
    ("beneficiaryExperience", "Beneficiary Experience"),
    ("innovationServices", "Innovation Services"),
    ("governanceRiskCompliance", "Governance, Risk & Compliance"),
];

impl ServiceInterest {
    /// Wrap a raw service key as submitted by the form.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key as submitted.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }

    /// Whether the key is one of the catalogued services.
    #[must_use]
    pub fn is_known(&self) -> bool {
        SERVICE_NAMES.iter().any(|(key, _)| *key == self.0)
    }

    /// Human-readable name for the service, falling back to the raw key.
    #[must_use]
    pub fn display_name(&self) -> &str {
        SERVICE_NAMES
            .iter()
            .find(|(key, _)| *key == self.0)
            .map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl std::fmt::Display for ServiceInterest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<String> for ServiceInterest {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for ServiceInterest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ServiceInterest {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ServiceInterest {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ServiceInterest {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
