//! Station model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{loose, non_blank, require, Collection, Entity};
use crate::Result;

/// A service station belonging to one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub location: Option<String>,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Station {
    const COLLECTION: Collection = Collection::Stations;
    const LABEL: &'static str = "Station";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationFields {
    pub name: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub location: Option<String>,
    #[serde(default)]
    pub organization_id: String,
}

impl StationFields {
    pub fn new(name: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            organization_id: organization_id.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn normalized(self) -> Result<Self> {
        require(&self.name, "Station name")?;
        if self.organization_id.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "Please select an organization".to_string(),
            ));
        }
        Ok(Self {
            name: self.name.trim().to_string(),
            code: non_blank(self.code),
            location: non_blank(self.location),
            organization_id: self.organization_id.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_requires_organization() {
        let err = StationFields::new("North Yard", "").normalized().unwrap_err();
        assert!(err.to_string().contains("Please select an organization"));
    }

    #[test]
    fn test_station_builders() {
        let fields = StationFields::new("North Yard", "org-1")
            .with_code("NY-01")
            .with_location("Pier 4")
            .normalized()
            .unwrap();
        assert_eq!(fields.code.as_deref(), Some("NY-01"));
        assert_eq!(fields.location.as_deref(), Some("Pier 4"));
    }
}
