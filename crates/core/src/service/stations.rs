//! Station façade

use std::sync::Arc;

use super::{acknowledge, respond, CollectionClient, ServiceResponse};
use crate::backend::DocumentStore;
use crate::model::{Station, StationFields};

#[derive(Clone)]
pub struct StationService {
    stations: CollectionClient<Station>,
}

impl StationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            stations: CollectionClient::new(store),
        }
    }

    pub async fn get_all_stations(&self) -> ServiceResponse<Vec<Station>> {
        respond("getAllStations", self.stations.all().await)
    }

    pub async fn get_stations_by_organization(
        &self,
        organization_id: &str,
    ) -> ServiceResponse<Vec<Station>> {
        respond(
            "getStationsByOrganization",
            self.stations.by_field("organizationId", organization_id).await,
        )
    }

    pub async fn count_stations_in_organization(
        &self,
        organization_id: &str,
    ) -> ServiceResponse<usize> {
        respond(
            "countStationsInOrganization",
            self.stations.count_by_field("organizationId", organization_id).await,
        )
    }

    pub async fn get_station_by_id(&self, id: &str) -> ServiceResponse<Station> {
        respond("getStationById", self.stations.by_id(id).await)
    }

    pub async fn create_station(&self, fields: &StationFields) -> ServiceResponse<Station> {
        match self.stations.create(fields).await {
            Ok(created) => ServiceResponse::created(created.id.clone(), created),
            Err(err) => respond("createStation", Err(err)),
        }
    }

    pub async fn update_station(&self, id: &str, fields: &StationFields) -> ServiceResponse<()> {
        acknowledge("updateStation", self.stations.update(id, fields).await)
    }

    pub async fn delete_station(&self, id: &str) -> ServiceResponse<()> {
        acknowledge("deleteStation", self.stations.delete(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};

    #[tokio::test]
    async fn test_stations_by_organization() {
        let backend = MemoryBackend::new();
        let stations = StationService::new(backend.connect().store);
        stations
            .create_station(&StationFields::new("North", "org-1").with_code("N1"))
            .await;
        stations.create_station(&StationFields::new("South", "org-2")).await;

        let scoped = stations.get_stations_by_organization("org-1").await.data.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].code.as_deref(), Some("N1"));
        assert!(scoped[0].active);
    }

    #[tokio::test]
    async fn test_rejected_create() {
        let backend = MemoryBackend::new();
        backend.set_reject_writes(true);
        let stations = StationService::new(backend.connect().store);
        let response = stations.create_station(&StationFields::new("North", "org-1")).await;
        assert!(!response.success);
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_update_station_location() {
        let backend = MemoryBackend::new();
        let stations = StationService::new(backend.connect().store);
        let id = stations
            .create_station(&StationFields::new("North", "org-1"))
            .await
            .id
            .unwrap();

        let fields = StationFields::new("North", "org-1").with_location("Pier 4");
        assert!(stations.update_station(&id, &fields).await.success);
        let station = stations.get_station_by_id(&id).await.data.unwrap();
        assert_eq!(station.location.as_deref(), Some("Pier 4"));
    }
}
