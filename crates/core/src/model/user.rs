//! User profile model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{loose, non_blank, require, Collection, Entity};
use crate::{Error, Result};

/// Access level stored on a user profile.
///
/// Profiles are written by hand as often as by the console, so a role
/// outside the known four decodes to [`Role::Other`] with the stored text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Role {
    GlobalAdmin,
    LocalAdmin,
    Tech,
    User,
    Other(String),
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::GlobalAdmin => "globalAdmin",
            Self::LocalAdmin => "localAdmin",
            Self::Tech => "tech",
            Self::User => "user",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this role may open the admin console.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::GlobalAdmin | Self::LocalAdmin)
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::GlobalAdmin => 3,
            Self::LocalAdmin => 2,
            Self::Tech => 1,
            Self::User | Self::Other(_) => 0,
        }
    }

    fn known(value: &str) -> Option<Self> {
        match value.trim() {
            "globalAdmin" => Some(Self::GlobalAdmin),
            "localAdmin" => Some(Self::LocalAdmin),
            "tech" => Some(Self::Tech),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::default(),
            Some(raw) => Self::known(&raw).unwrap_or(Self::Other(raw)),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::known(value)
            .ok_or_else(|| Error::InvalidInput(format!("Unsupported role '{}'", value.trim())))
    }
}

/// Profile document linked 1:1 to an auth identity through `auth_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub auth_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "loose::text")]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub station_id: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;
    const LABEL: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Editable profile fields. The auth link is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    pub email: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "loose::text")]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub station_id: Option<String>,
}

impl UserFields {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_station(mut self, station_id: impl Into<String>) -> Self {
        self.station_id = Some(station_id.into());
        self
    }

    pub fn normalized(self) -> Result<Self> {
        require(&self.email, "Email")?;
        if let Role::Other(raw) = &self.role {
            return Err(Error::InvalidInput(format!("Unsupported role '{}'", raw)));
        }
        Ok(Self {
            email: self.email.trim().to_lowercase(),
            name: non_blank(self.name),
            role: self.role,
            organization_id: non_blank(self.organization_id),
            station_id: non_blank(self.station_id),
        })
    }
}

/// A profile to be written for a freshly created auth identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub auth_id: String,
    #[serde(flatten)]
    pub fields: UserFields,
}

impl NewUser {
    pub fn new(auth_id: impl Into<String>, fields: UserFields) -> Self {
        Self {
            auth_id: auth_id.into(),
            fields,
        }
    }
}
