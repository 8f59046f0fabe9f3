//! Organization façade

use std::sync::Arc;

use super::{acknowledge, respond, CollectionClient, ServiceResponse};
use crate::backend::DocumentStore;
use crate::model::{Organization, OrganizationFields};

#[derive(Clone)]
pub struct OrganizationService {
    organizations: CollectionClient<Organization>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            organizations: CollectionClient::new(store),
        }
    }

    pub async fn get_all_organizations(&self) -> ServiceResponse<Vec<Organization>> {
        respond("getAllOrganizations", self.organizations.all().await)
    }

    pub async fn get_organization_by_id(&self, id: &str) -> ServiceResponse<Organization> {
        respond("getOrganizationById", self.organizations.by_id(id).await)
    }

    pub async fn create_organization(
        &self,
        fields: &OrganizationFields,
    ) -> ServiceResponse<Organization> {
        match self.organizations.create(fields).await {
            Ok(created) => ServiceResponse::created(created.id.clone(), created),
            Err(err) => respond("createOrganization", Err(err)),
        }
    }

    pub async fn update_organization(
        &self,
        id: &str,
        fields: &OrganizationFields,
    ) -> ServiceResponse<()> {
        acknowledge(
            "updateOrganization",
            self.organizations.update(id, fields).await,
        )
    }

    pub async fn delete_organization(&self, id: &str) -> ServiceResponse<()> {
        acknowledge("deleteOrganization", self.organizations.delete(id).await)
    }
}
