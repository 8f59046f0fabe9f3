//! Organization model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{loose, non_blank, require, Collection, Entity};
use crate::Result;

/// A customer organization. Owns stations and scopes users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub phone: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Organization {
    const COLLECTION: Collection = Collection::Organizations;
    const LABEL: &'static str = "Organization";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Editable organization fields, used for create and full overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationFields {
    pub name: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub phone: Option<String>,
}

impl OrganizationFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Trim values and check required fields, as the edit form does.
    pub fn normalized(self) -> Result<Self> {
        require(&self.name, "Organization name")?;
        Ok(Self {
            name: self.name.trim().to_string(),
            contact_email: non_blank(self.contact_email),
            phone: non_blank(self.phone),
        })
    }
}
