//! Entity models
//!
//! Every entity is stored as a loosely-typed document in one of four
//! collections. Fields are camelCase in storage; missing optional fields
//! decode to `None` and a missing `active` flag decodes to `false`.

mod equipment;
mod organization;
mod station;
mod user;

pub use equipment::*;
pub use organization::*;
pub use station::*;
pub use user::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Document collections used by the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Users,
    Organizations,
    Stations,
    Equipment,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Self::Users,
        Self::Organizations,
        Self::Stations,
        Self::Equipment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Organizations => "organizations",
            Self::Stations => "stations",
            Self::Equipment => "equipment",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed view over documents of one collection.
pub trait Entity: DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Human-readable entity name used in "not found" messages.
    const LABEL: &'static str;

    fn id(&self) -> &str;
}

/// Trim a form value and drop it when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Lenient field decoders for hand-edited documents. A value of the wrong
/// shape decodes to `None` instead of failing the whole record.
pub(crate) mod loose {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(text)) => Some(text),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(flag)) => Some(flag.to_string()),
            _ => None,
        })
    }

    /// `YYYY-MM-DD`, as written by a date input. Blank means unset.
    pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(text)) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
            _ => None,
        })
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(text)) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|stamp| stamp.with_timezone(&Utc)),
            _ => None,
        })
    }
}

pub(crate) fn require(value: &str, field: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}
