//! Console commands and their notifications

use serde::{Deserialize, Serialize};

use crate::model::{EquipmentFields, OrganizationFields, StationFields, UserFields};

/// An action requested from the console UI, keyed by action name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    Refresh,
    CreateOrganization {
        fields: OrganizationFields,
    },
    UpdateOrganization {
        id: String,
        fields: OrganizationFields,
    },
    DeleteOrganization {
        id: String,
    },
    CreateStation {
        fields: StationFields,
    },
    UpdateStation {
        id: String,
        fields: StationFields,
    },
    DeleteStation {
        id: String,
    },
    CreateEquipment {
        fields: EquipmentFields,
    },
    UpdateEquipment {
        id: String,
        fields: EquipmentFields,
    },
    DeleteEquipment {
        id: String,
    },
    CreateUser {
        fields: UserFields,
        password: String,
    },
    UpdateUser {
        id: String,
        fields: UserFields,
    },
    DeleteUser {
        id: String,
    },
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::CreateOrganization { .. } => "createOrganization",
            Self::UpdateOrganization { .. } => "updateOrganization",
            Self::DeleteOrganization { .. } => "deleteOrganization",
            Self::CreateStation { .. } => "createStation",
            Self::UpdateStation { .. } => "updateStation",
            Self::DeleteStation { .. } => "deleteStation",
            Self::CreateEquipment { .. } => "createEquipment",
            Self::UpdateEquipment { .. } => "updateEquipment",
            Self::DeleteEquipment { .. } => "deleteEquipment",
            Self::CreateUser { .. } => "createUser",
            Self::UpdateUser { .. } => "updateUser",
            Self::DeleteUser { .. } => "deleteUser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    Success,
    Error,
}

/// Result of a command as shown to the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == Level::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    #[test]
    fn test_commands_are_keyed_by_action() {
        let command: Command = serde_json::from_value(serde_json::json!({
            "action": "createStation",
            "fields": { "name": "North", "organizationId": "o1", "location": "Pier 4" }
        }))
        .unwrap();
        assert_eq!(command.action(), "createStation");
        assert_eq!(
            command,
            Command::CreateStation {
                fields: StationFields::new("North", "o1").with_location("Pier 4"),
            }
        );
    }

    #[test]
    fn test_create_user_carries_password() {
        let command: Command = serde_json::from_value(serde_json::json!({
            "action": "createUser",
            "password": "secret1",
            "fields": { "email": "t@acme.test", "role": "tech" }
        }))
        .unwrap();
        let Command::CreateUser { fields, password } = command else {
            panic!("wrong command");
        };
        assert_eq!(fields.role, Role::Tech);
        assert_eq!(password, "secret1");
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let parsed = serde_json::from_value::<Command>(serde_json::json!({ "action": "dropAll" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_refresh_serializes_bare() {
        assert_eq!(
            serde_json::to_value(Command::Refresh).unwrap(),
            serde_json::json!({ "action": "refresh" })
        );
    }
}
