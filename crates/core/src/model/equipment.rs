//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{loose, non_blank, require, Collection, Entity};
use crate::Result;

/// A piece of equipment installed at a station.
///
/// `organization_id` is a copy of the station's organization taken when the
/// record is written. It is not kept in sync if the station later moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    /// Asset tag shown to technicians.
    #[serde(default)]
    pub equipment_id: String,
    #[serde(default, rename = "type", deserialize_with = "loose::text")]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub station_id: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose::date")]
    pub last_service: Option<NaiveDate>,
    #[serde(default, deserialize_with = "loose::text")]
    pub notes: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "loose::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Equipment {
    const COLLECTION: Collection = Collection::Equipment;
    const LABEL: &'static str = "Equipment";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFields {
    pub equipment_id: String,
    #[serde(default, rename = "type", deserialize_with = "loose::text")]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub station_id: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "loose::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose::date")]
    pub last_service: Option<NaiveDate>,
    #[serde(default, deserialize_with = "loose::text")]
    pub notes: Option<String>,
}

impl EquipmentFields {
    pub fn new(equipment_id: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            station_id: station_id.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, equipment_type: impl Into<String>) -> Self {
        self.equipment_type = Some(equipment_type.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_last_service(mut self, date: NaiveDate) -> Self {
        self.last_service = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn normalized(self) -> Result<Self> {
        require(&self.equipment_id, "Equipment ID")?;
        if self.station_id.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "Please select a station".to_string(),
            ));
        }
        Ok(Self {
            equipment_id: self.equipment_id.trim().to_string(),
            equipment_type: non_blank(self.equipment_type),
            station_id: self.station_id.trim().to_string(),
            organization_id: non_blank(self.organization_id),
            status: non_blank(self.status),
            last_service: self.last_service,
            notes: non_blank(self.notes),
        })
    }
}
