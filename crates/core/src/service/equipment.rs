//! Equipment façade

use std::sync::Arc;

use super::{acknowledge, respond, CollectionClient, ServiceResponse};
use crate::backend::DocumentStore;
use crate::model::{Equipment, EquipmentFields};

#[derive(Clone)]
pub struct EquipmentService {
    equipment: CollectionClient<Equipment>,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            equipment: CollectionClient::new(store),
        }
    }

    pub async fn get_all_equipment(&self) -> ServiceResponse<Vec<Equipment>> {
        respond("getAllEquipment", self.equipment.all().await)
    }

    pub async fn get_equipment_by_station(&self, station_id: &str) -> ServiceResponse<Vec<Equipment>> {
        respond(
            "getEquipmentByStation",
            self.equipment.by_field("stationId", station_id).await,
        )
    }

    /// Stored equipment attached to a station, regardless of who may see it.
    pub async fn count_equipment_at_station(&self, station_id: &str) -> ServiceResponse<usize> {
        respond(
            "countEquipmentAtStation",
            self.equipment.count_by_field("stationId", station_id).await,
        )
    }

    pub async fn get_equipment_by_organization(
        &self,
        organization_id: &str,
    ) -> ServiceResponse<Vec<Equipment>> {
        respond(
            "getEquipmentByOrganization",
            self.equipment.by_field("organizationId", organization_id).await,
        )
    }

    pub async fn get_equipment_by_id(&self, id: &str) -> ServiceResponse<Equipment> {
        respond("getEquipmentById", self.equipment.by_id(id).await)
    }

    pub async fn create_equipment(&self, fields: &EquipmentFields) -> ServiceResponse<Equipment> {
        match self.equipment.create(fields).await {
            Ok(created) => ServiceResponse::created(created.id.clone(), created),
            Err(err) => respond("createEquipment", Err(err)),
        }
    }

    pub async fn update_equipment(&self, id: &str, fields: &EquipmentFields) -> ServiceResponse<()> {
        acknowledge("updateEquipment", self.equipment.update(id, fields).await)
    }

    pub async fn delete_equipment(&self, id: &str) -> ServiceResponse<()> {
        acknowledge("deleteEquipment", self.equipment.delete(id).await)
    }
}
