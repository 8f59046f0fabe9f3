//! Service façade
//!
//! One façade per resource. Each operation makes a single backend call and
//! reports the outcome as a [`ServiceResponse`]; failures never surface as
//! `Err` to the caller.

mod auth;
mod collection;
mod equipment;
mod organizations;
mod stations;
mod users;

pub use auth::AuthService;
pub use collection::CollectionClient;
pub use equipment::EquipmentService;
pub use organizations::OrganizationService;
pub use stations::StationService;
pub use users::UserService;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::Connection;
use crate::error::AuthErrorCode;
use crate::Result;

/// Uniform outcome of a façade call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    auth_code: Option<AuthErrorCode>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            id: None,
            data: Some(data),
            error: None,
            auth_code: None,
        }
    }

    pub fn created(id: impl Into<String>, data: T) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::ok(data)
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            data: None,
            error: Some(error.into()),
            auth_code: None,
        }
    }

    /// Code of the identity failure behind this response, if any.
    pub fn auth_code(&self) -> Option<AuthErrorCode> {
        self.auth_code
    }

    pub fn into_result(self) -> std::result::Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

impl ServiceResponse<()> {
    /// Success without a payload.
    pub fn done() -> Self {
        Self {
            success: true,
            id: None,
            data: None,
            error: None,
            auth_code: None,
        }
    }
}

/// Fold a backend result into a response, logging the failure.
pub(crate) fn respond<T>(operation: &str, result: Result<T>) -> ServiceResponse<T> {
    match result {
        Ok(data) => ServiceResponse::ok(data),
        Err(err) => failed(operation, err),
    }
}

pub(crate) fn acknowledge(operation: &str, result: Result<()>) -> ServiceResponse<()> {
    match result {
        Ok(()) => ServiceResponse::done(),
        Err(err) => failed(operation, err),
    }
}

fn failed<T>(operation: &str, err: crate::Error) -> ServiceResponse<T> {
    warn!(operation, error = %err, "Service call failed");
    ServiceResponse {
        auth_code: err.auth_code(),
        ..ServiceResponse::failure(err.message())
    }
}

/// All façades bound to one backend connection.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub organizations: OrganizationService,
    pub stations: StationService,
    pub equipment: EquipmentService,
}

impl Services {
    pub fn new(connection: &Connection) -> Self {
        Self {
            auth: AuthService::new(connection.auth.clone()),
            users: UserService::new(connection.store.clone()),
            organizations: OrganizationService::new(connection.store.clone()),
            stations: StationService::new(connection.store.clone()),
            equipment: EquipmentService::new(connection.store.clone()),
        }
    }
}
