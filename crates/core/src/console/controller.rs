//! Admin console controller
//!
//! Owns the authorized principal, the façades of its connection and the
//! loaded lists. Commands go through [`AdminConsole::dispatch`], which calls
//! the façade and then splices the result into the lists.

use tracing::{info, warn};

use super::command::{Command, Notification};
use super::guard;
use super::scope::{Principal, Scope};
use super::state::ConsoleState;
use super::view::ConsoleView;
use crate::model::{
    EquipmentFields, NewUser, OrganizationFields, Role, Station, StationFields, UserFields,
};
use crate::service::{ServiceResponse, Services};

type Outcome = std::result::Result<String, String>;

pub struct AdminConsole {
    principal: Principal,
    scope: Scope,
    services: Services,
    state: ConsoleState,
}

impl AdminConsole {
    pub fn new(principal: Principal, services: Services) -> Self {
        let scope = principal.scope();
        Self {
            principal,
            scope,
            services,
            state: ConsoleState::new(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn view(&self) -> ConsoleView {
        ConsoleView::build(&self.principal, &self.state)
    }

    pub async fn sign_out(&self) -> ServiceResponse<()> {
        self.services.auth.sign_out().await
    }

    /// Fetch all four lists concurrently. A list whose fetch fails keeps its
    /// previous contents.
    pub async fn load_all(&mut self) {
        let (users, organizations, stations, equipment) = futures::join!(
            self.services.users.get_all_users(),
            self.services.organizations.get_all_organizations(),
            self.services.stations.get_all_stations(),
            self.services.equipment.get_all_equipment(),
        );

        if let Some(users) = loaded("users", users) {
            self.state.users = self.scope.retain(users);
        }
        if let Some(organizations) = loaded("organizations", organizations) {
            self.state.organizations = self.scope.retain(organizations);
        }
        if let Some(stations) = loaded("stations", stations) {
            self.state.stations = self.scope.retain(stations);
        }
        if let Some(equipment) = loaded("equipment", equipment) {
            self.state.equipment = self.scope.retain(equipment);
        }
        info!(
            users = self.state.users.len(),
            organizations = self.state.organizations.len(),
            stations = self.state.stations.len(),
            equipment = self.state.equipment.len(),
            "Console data loaded"
        );
    }

    pub async fn dispatch(&mut self, command: Command) -> Notification {
        let action = command.action();
        info!(action, admin = %self.principal.auth.email, "Dispatching console command");

        let outcome = match command {
            Command::Refresh => {
                self.load_all().await;
                Ok("Data refreshed.".to_string())
            }
            Command::CreateOrganization { fields } => self.create_organization(fields).await,
            Command::UpdateOrganization { id, fields } => {
                self.update_organization(&id, fields).await
            }
            Command::DeleteOrganization { id } => self.delete_organization(&id).await,
            Command::CreateStation { fields } => self.create_station(fields).await,
            Command::UpdateStation { id, fields } => self.update_station(&id, fields).await,
            Command::DeleteStation { id } => self.delete_station(&id).await,
            Command::CreateEquipment { fields } => self.create_equipment(fields).await,
            Command::UpdateEquipment { id, fields } => self.update_equipment(&id, fields).await,
            Command::DeleteEquipment { id } => self.delete_equipment(&id).await,
            Command::CreateUser { fields, password } => self.create_user(fields, &password).await,
            Command::UpdateUser { id, fields } => self.update_user(&id, fields).await,
            Command::DeleteUser { id } => self.delete_user(&id).await,
        };

        match outcome {
            Ok(message) => Notification::success(message),
            Err(message) => {
                warn!(action, %message, "Console command refused");
                Notification::error(message)
            }
        }
    }

    fn ensure_organization(&self, organization_id: Option<&str>) -> Result<(), String> {
        if self.scope.allows(organization_id) {
            Ok(())
        } else {
            Err("You do not have access to that organization.".to_string())
        }
    }

    fn ensure_global(&self, what: &str) -> Result<(), String> {
        if self.scope.is_global() {
            Ok(())
        } else {
            Err(format!("Only a global admin can {}.", what))
        }
    }

    async fn create_organization(&mut self, fields: OrganizationFields) -> Outcome {
        self.ensure_global("create organizations")?;
        let fields = fields.normalized().map_err(|e| e.message())?;
        let organization = created(self.services.organizations.create_organization(&fields).await)?;
        self.state.put_organization(organization);
        Ok("Organization created successfully!".to_string())
    }

    async fn update_organization(&mut self, id: &str, fields: OrganizationFields) -> Outcome {
        if self.state.organization(id).is_none() {
            return Err("Organization not found".to_string());
        }
        let fields = fields.normalized().map_err(|e| e.message())?;
        done(self.services.organizations.update_organization(id, &fields).await)?;
        if let Some(organization) = self.services.organizations.get_organization_by_id(id).await.data {
            self.state.put_organization(organization);
        }
        Ok("Organization updated successfully!".to_string())
    }

    async fn delete_organization(&mut self, id: &str) -> Outcome {
        self.ensure_global("delete organizations")?;
        if self.state.organization(id).is_none() {
            return Err("Organization not found".to_string());
        }
        let stored = attached(self.services.stations.count_stations_in_organization(id).await)?;
        guard::check_organization_delete(&self.state, id, stored).map_err(|e| e.to_string())?;
        done(self.services.organizations.delete_organization(id).await)?;
        self.state.remove_organization(id);
        Ok("Organization deleted.".to_string())
    }

    async fn create_station(&mut self, fields: StationFields) -> Outcome {
        let fields = fields.normalized().map_err(|e| e.message())?;
        self.ensure_organization(Some(&fields.organization_id))?;
        let station = created(self.services.stations.create_station(&fields).await)?;
        self.state.put_station(station);
        Ok("Station created successfully!".to_string())
    }

    async fn update_station(&mut self, id: &str, fields: StationFields) -> Outcome {
        if self.state.station(id).is_none() {
            return Err("Station not found".to_string());
        }
        let fields = fields.normalized().map_err(|e| e.message())?;
        self.ensure_organization(Some(&fields.organization_id))?;
        done(self.services.stations.update_station(id, &fields).await)?;
        if let Some(station) = self.services.stations.get_station_by_id(id).await.data {
            self.state.put_station(station);
        }
        Ok("Station updated successfully!".to_string())
    }

    async fn delete_station(&mut self, id: &str) -> Outcome {
        if self.state.station(id).is_none() {
            return Err("Station not found".to_string());
        }
        let stored = attached(self.services.equipment.count_equipment_at_station(id).await)?;
        guard::check_station_delete(&self.state, id, stored).map_err(|e| e.to_string())?;
        done(self.services.stations.delete_station(id).await)?;
        self.state.remove_station(id);
        Ok("Station deleted.".to_string())
    }

    /// The station an equipment record is attached to, from the loaded list
    /// or else from the store.
    async fn station_for(&self, station_id: &str) -> Result<Station, String> {
        if let Some(station) = self.state.station(station_id) {
            return Ok(station.clone());
        }
        self.services
            .stations
            .get_station_by_id(station_id)
            .await
            .into_result()?
            .ok_or_else(|| "Station not found".to_string())
    }

    /// Copy the station's organization onto the record. The copy is not
    /// refreshed if the station later moves.
    async fn attach_to_station(&self, fields: EquipmentFields) -> Result<EquipmentFields, String> {
        let mut fields = fields.normalized().map_err(|e| e.message())?;
        let station = self.station_for(&fields.station_id).await?;
        self.ensure_organization(Some(&station.organization_id))?;
        fields.organization_id = Some(station.organization_id);
        Ok(fields)
    }

    async fn create_equipment(&mut self, fields: EquipmentFields) -> Outcome {
        let fields = self.attach_to_station(fields).await?;
        let item = created(self.services.equipment.create_equipment(&fields).await)?;
        self.state.put_equipment(item);
        Ok("Equipment created successfully!".to_string())
    }

    async fn update_equipment(&mut self, id: &str, fields: EquipmentFields) -> Outcome {
        if self.state.equipment_item(id).is_none() {
            return Err("Equipment not found".to_string());
        }
        let fields = self.attach_to_station(fields).await?;
        done(self.services.equipment.update_equipment(id, &fields).await)?;
        if let Some(item) = self.services.equipment.get_equipment_by_id(id).await.data {
            self.state.put_equipment(item);
        }
        Ok("Equipment updated successfully!".to_string())
    }

    async fn delete_equipment(&mut self, id: &str) -> Outcome {
        if self.state.equipment_item(id).is_none() {
            return Err("Equipment not found".to_string());
        }
        done(self.services.equipment.delete_equipment(id).await)?;
        self.state.remove_equipment(id);
        Ok("Equipment deleted.".to_string())
    }

    /// Check role and organization of a profile written by this admin. A
    /// local admin's users land in the admin's organization by default.
    fn scoped_user_fields(&self, fields: UserFields) -> Result<UserFields, String> {
        let mut fields = fields.normalized().map_err(|e| e.message())?;
        if !self.scope.can_assign(&fields.role) {
            return Err(format!("You cannot assign the {} role.", Role::GlobalAdmin));
        }
        if let Some(own) = self.scope.organization_id() {
            fields.organization_id.get_or_insert_with(|| own.to_string());
        }
        if !self.scope.is_global() {
            self.ensure_organization(fields.organization_id.as_deref())?;
        }
        Ok(fields)
    }

    async fn create_user(&mut self, fields: UserFields, password: &str) -> Outcome {
        let fields = self.scoped_user_fields(fields)?;

        let identity = self
            .services
            .auth
            .create_auth_user(&fields.email, password)
            .await
            .into_result()
            .map_err(|error| format!("Error creating auth user: {}", error))?
            .ok_or_else(|| "Error creating auth user: no identity returned".to_string())?;

        let response = self
            .services
            .users
            .create_user(&NewUser::new(identity.uid.clone(), fields))
            .await;
        let user = match response.into_result() {
            Ok(Some(user)) => user,
            Ok(None) => return Err("Error creating user document: no data returned".to_string()),
            Err(error) => {
                warn!(uid = %identity.uid, "Auth identity left without a profile");
                return Err(format!("Error creating user document: {}", error));
            }
        };
        self.state.put_user(user);
        Ok("User created successfully!".to_string())
    }

    async fn update_user(&mut self, id: &str, fields: UserFields) -> Outcome {
        if self.state.user(id).is_none() {
            return Err("User not found".to_string());
        }
        let fields = self.scoped_user_fields(fields)?;
        done(self.services.users.update_user(id, &fields).await)?;
        if let Some(user) = self.services.users.get_user_by_id(id).await.data {
            self.state.put_user(user);
        }
        Ok("User updated successfully!".to_string())
    }

    async fn delete_user(&mut self, id: &str) -> Outcome {
        let target = self
            .state
            .user(id)
            .ok_or_else(|| "User not found".to_string())?;
        guard::check_user_delete(&self.principal.profile, target).map_err(|e| e.to_string())?;
        done(self.services.users.delete_user(id).await)?;
        self.state.remove_user(id);
        Ok("User deleted.".to_string())
    }
}

fn loaded<T>(list: &str, response: ServiceResponse<Vec<T>>) -> Option<Vec<T>> {
    match response.into_result() {
        Ok(items) => Some(items.unwrap_or_default()),
        Err(error) => {
            warn!(list, %error, "Failed to load list, keeping previous contents");
            None
        }
    }
}

fn created<T>(response: ServiceResponse<T>) -> Result<T, String> {
    response
        .into_result()
        .map_err(|error| format!("Error: {}", error))?
        .ok_or_else(|| "Error: no data returned".to_string())
}

/// Count of attached records in the store. A failed count refuses the
/// delete, since nothing proves the record is free.
fn attached(response: ServiceResponse<usize>) -> Result<usize, String> {
    response
        .into_result()
        .map(Option::unwrap_or_default)
        .map_err(|error| format!("Error: could not check attached records: {}", error))
}

fn done(response: ServiceResponse<()>) -> Result<(), String> {
    response
        .into_result()
        .map(|_| ())
        .map_err(|error| format!("Error: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{to_fields, Backend, MemoryBackend};
    use crate::console::AuthGate;
    use crate::model::Collection;

    async fn seed_admin(
        backend: &MemoryBackend,
        email: &str,
        role: Role,
        organization_id: Option<&str>,
    ) {
        let account = backend.create_account(email, "secret1").await.unwrap();
        let mut fields = UserFields::new(email, role);
        fields.organization_id = organization_id.map(str::to_string);
        let mut doc = to_fields(&NewUser::new(account.uid, fields)).unwrap();
        doc.insert("active".to_string(), serde_json::Value::Bool(true));
        backend.insert_document(Collection::Users, doc).await.unwrap();
    }

    async fn open(backend: &MemoryBackend, email: &str) -> AdminConsole {
        let services = Services::new(&backend.connect());
        assert!(services.auth.sign_in(email, "secret1").await.success);
        let principal = AuthGate::new(services.auth.clone(), services.users.clone())
            .check()
            .await
            .into_principal()
            .unwrap();
        let mut console = AdminConsole::new(principal, services);
        console.load_all().await;
        console
    }

    async fn global_console(backend: &MemoryBackend) -> AdminConsole {
        seed_admin(backend, "root@fixit.test", Role::GlobalAdmin, None).await;
        open(backend, "root@fixit.test").await
    }

    async fn create_org(console: &mut AdminConsole, name: &str) -> String {
        let note = console
            .dispatch(Command::CreateOrganization {
                fields: OrganizationFields::new(name),
            })
            .await;
        assert!(note.is_success(), "{}", note.message);
        console
            .state()
            .organizations
            .iter()
            .find(|org| org.name == name)
            .map(|org| org.id.clone())
            .unwrap()
    }

    async fn create_station(console: &mut AdminConsole, name: &str, org: &str) -> String {
        let note = console
            .dispatch(Command::CreateStation {
                fields: StationFields::new(name, org),
            })
            .await;
        assert!(note.is_success(), "{}", note.message);
        console
            .state()
            .stations
            .iter()
            .find(|station| station.name == name)
            .map(|station| station.id.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_equipment_copies_station_organization() {
        let backend = MemoryBackend::new();
        let mut console = global_console(&backend).await;
        let org_a = create_org(&mut console, "Acme").await;
        let org_b = create_org(&mut console, "Bolt").await;
        let station = create_station(&mut console, "North", &org_a).await;

        let note = console
            .dispatch(Command::CreateEquipment {
                fields: EquipmentFields::new("PUMP-7", station.clone()),
            })
            .await;
        assert_eq!(note, Notification::success("Equipment created successfully!"));
        let item = console.state().equipment[0].clone();
        assert_eq!(item.organization_id.as_deref(), Some(org_a.as_str()));

        // moving the station later leaves the copy alone
        let note = console
            .dispatch(Command::UpdateStation {
                id: station.clone(),
                fields: StationFields::new("North", org_b.clone()),
            })
            .await;
        assert!(note.is_success());
        console.load_all().await;
        let reloaded = console.state().equipment_item(&item.id).unwrap();
        assert_eq!(reloaded.organization_id.as_deref(), Some(org_a.as_str()));
    }

    #[tokio::test]
    async fn test_equipment_station_fetched_when_not_loaded() {
        let backend = MemoryBackend::new();
        let mut console = global_console(&backend).await;
        let mut station = to_fields(&StationFields::new("Remote", "org-r")).unwrap();
        station.insert("active".to_string(), serde_json::Value::Bool(true));
        let station = backend
            .insert_document(Collection::Stations, station)
            .await
            .unwrap();

        let note = console
            .dispatch(Command::CreateEquipment {
                fields: EquipmentFields::new("VALVE-1", station.id),
            })
            .await;
        assert!(note.is_success(), "{}", note.message);
        assert_eq!(
            console.state().equipment[0].organization_id.as_deref(),
            Some("org-r")
        );
    }

    #[tokio::test]
    async fn test_station_delete_guard() {
        let backend = MemoryBackend::new();
        let mut console = global_console(&backend).await;
        let org = create_org(&mut console, "Acme").await;
        let busy = create_station(&mut console, "North", &org).await;
        let idle = create_station(&mut console, "South", &org).await;
        console
            .dispatch(Command::CreateEquipment {
                fields: EquipmentFields::new("PUMP-7", busy.clone()),
            })
            .await;

        let refused = console.dispatch(Command::DeleteStation { id: busy.clone() }).await;
        assert!(!refused.is_success());
        assert!(refused.message.contains("equipment"));
        assert!(console.state().station(&busy).is_some());
        assert_eq!(backend.document_count(Collection::Stations).await, 2);

        let deleted = console.dispatch(Command::DeleteStation { id: idle.clone() }).await;
        assert!(deleted.is_success());
        assert!(console.state().station(&idle).is_none());
        assert_eq!(backend.document_count(Collection::Stations).await, 1);
    }

    #[tokio::test]
    async fn test_station_delete_counts_equipment_outside_scope() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;
        let org_a = create_org(&mut root, "Acme").await;
        let org_b = create_org(&mut root, "Bolt").await;
        let station = create_station(&mut root, "North", &org_a).await;
        let note = root
            .dispatch(Command::CreateEquipment {
                fields: EquipmentFields::new("PUMP-7", station.clone()),
            })
            .await;
        assert!(note.is_success(), "{}", note.message);
        let moved = root
            .dispatch(Command::UpdateStation {
                id: station.clone(),
                fields: StationFields::new("North", org_b.clone()),
            })
            .await;
        assert!(moved.is_success(), "{}", moved.message);

        seed_admin(&backend, "local@bolt.test", Role::LocalAdmin, Some(&org_b)).await;
        let mut local = open(&backend, "local@bolt.test").await;
        assert!(local.state().station(&station).is_some());
        assert!(local.state().equipment.is_empty());

        let refused = local.dispatch(Command::DeleteStation { id: station.clone() }).await;
        assert!(!refused.is_success());
        assert!(refused.message.contains("1 equipment"), "{}", refused.message);
        assert_eq!(backend.document_count(Collection::Stations).await, 1);
    }

    #[tokio::test]
    async fn test_station_delete_counts_undecodable_equipment() {
        let backend = MemoryBackend::new();
        let mut console = global_console(&backend).await;
        let org = create_org(&mut console, "Acme").await;
        let station = create_station(&mut console, "North", &org).await;
        let serde_json::Value::Object(fields) = serde_json::json!({
            "equipmentId": { "tag": "PUMP-7" },
            "stationId": station,
            "organizationId": org,
            "lastService": "",
            "active": true
        }) else {
            unreachable!()
        };
        backend
            .insert_document(Collection::Equipment, fields)
            .await
            .unwrap();

        console.load_all().await;
        assert!(console.state().equipment.is_empty());

        let refused = console.dispatch(Command::DeleteStation { id: station.clone() }).await;
        assert!(!refused.is_success());
        assert_eq!(backend.document_count(Collection::Stations).await, 1);
    }

    #[tokio::test]
    async fn test_blank_service_date_still_lists_equipment() {
        let backend = MemoryBackend::new();
        let mut console = global_console(&backend).await;
        let org = create_org(&mut console, "Acme").await;
        let station = create_station(&mut console, "North", &org).await;
        let serde_json::Value::Object(fields) = serde_json::json!({
            "equipmentId": "PUMP-9",
            "stationId": station,
            "organizationId": org,
            "lastService": "",
            "active": true
        }) else {
            unreachable!()
        };
        backend
            .insert_document(Collection::Equipment, fields)
            .await
            .unwrap();

        console.load_all().await;
        assert_eq!(console.state().equipment.len(), 1);
        assert!(console.state().equipment[0].last_service.is_none());
    }

    #[tokio::test]
    async fn test_organization_delete_guard() {
        let backend = MemoryBackend::new();
        let mut console = global_console(&backend).await;
        let busy = create_org(&mut console, "Acme").await;
        let idle = create_org(&mut console, "Bolt").await;
        create_station(&mut console, "North", &busy).await;

        let refused = console
            .dispatch(Command::DeleteOrganization { id: busy.clone() })
            .await;
        assert!(!refused.is_success());
        assert!(console.state().organization(&busy).is_some());

        let deleted = console.dispatch(Command::DeleteOrganization { id: idle }).await;
        assert!(deleted.is_success());
        assert_eq!(backend.document_count(Collection::Organizations).await, 1);
    }

    #[tokio::test]
    async fn test_local_admin_sees_own_organization_only() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;
        let org_x = create_org(&mut root, "X").await;
        let org_y = create_org(&mut root, "Y").await;
        create_station(&mut root, "X1", &org_x).await;
        create_station(&mut root, "Y1", &org_y).await;
        for (email, org) in [("a@x.test", &org_x), ("b@y.test", &org_y)] {
            let note = root
                .dispatch(Command::CreateUser {
                    fields: UserFields::new(email, Role::Tech).with_organization(org.clone()),
                    password: "secret1".to_string(),
                })
                .await;
            assert!(note.is_success(), "{}", note.message);
        }
        seed_admin(&backend, "local@x.test", Role::LocalAdmin, Some(&org_x)).await;

        let local = open(&backend, "local@x.test").await;
        let state = local.state();
        assert_eq!(state.users.len(), 2);
        assert!(state
            .users
            .iter()
            .all(|u| u.organization_id.as_deref() == Some(org_x.as_str())));
        assert_eq!(state.organizations.len(), 1);
        assert_eq!(state.stations.len(), 1);

        root.load_all().await;
        assert_eq!(root.state().users.len(), 4);
    }

    #[tokio::test]
    async fn test_local_admin_limits() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;
        let org_x = create_org(&mut root, "X").await;
        let org_y = create_org(&mut root, "Y").await;
        seed_admin(&backend, "local@x.test", Role::LocalAdmin, Some(&org_x)).await;
        let mut local = open(&backend, "local@x.test").await;

        let foreign = local
            .dispatch(Command::CreateStation {
                fields: StationFields::new("Y2", org_y),
            })
            .await;
        assert!(!foreign.is_success());

        let promote = local
            .dispatch(Command::CreateUser {
                fields: UserFields::new("boss@x.test", Role::GlobalAdmin),
                password: "secret1".to_string(),
            })
            .await;
        assert!(!promote.is_success());

        let tech = local
            .dispatch(Command::CreateUser {
                fields: UserFields::new("tech@x.test", Role::Tech),
                password: "secret1".to_string(),
            })
            .await;
        assert!(tech.is_success(), "{}", tech.message);
        let created = local
            .state()
            .users
            .iter()
            .find(|u| u.email == "tech@x.test")
            .unwrap();
        assert_eq!(created.organization_id.as_deref(), Some(org_x.as_str()));
        assert!(created.active);
    }

    #[tokio::test]
    async fn test_user_delete_guards() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;
        seed_admin(&backend, "peer@fixit.test", Role::GlobalAdmin, None).await;
        root.load_all().await;

        let own_id = root.principal().profile.id.clone();
        let own = root.dispatch(Command::DeleteUser { id: own_id }).await;
        assert_eq!(own.message, "You cannot delete your own account.");

        let peer_id = root
            .state()
            .users
            .iter()
            .find(|u| u.email == "peer@fixit.test")
            .map(|u| u.id.clone())
            .unwrap();
        let peer = root.dispatch(Command::DeleteUser { id: peer_id }).await;
        assert!(!peer.is_success());
        assert_eq!(backend.document_count(Collection::Users).await, 2);
    }

    #[tokio::test]
    async fn test_create_user_reports_auth_failure() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;

        let weak = root
            .dispatch(Command::CreateUser {
                fields: UserFields::new("tech@fixit.test", Role::Tech),
                password: "123".to_string(),
            })
            .await;
        assert!(weak.message.starts_with("Error creating auth user: "));
        assert_eq!(backend.document_count(Collection::Users).await, 1);
    }

    #[tokio::test]
    async fn test_rejected_write_leaves_lists_untouched() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;
        create_org(&mut root, "Acme").await;
        assert_eq!(root.state().organizations.len(), 1);

        backend.set_reject_writes(true);
        let note = root
            .dispatch(Command::CreateOrganization {
                fields: OrganizationFields::new("Bolt"),
            })
            .await;
        assert_eq!(note, Notification::error("Error: Missing or insufficient permissions."));
        assert_eq!(root.state().organizations.len(), 1);
    }

    #[tokio::test]
    async fn test_station_requires_organization() {
        let backend = MemoryBackend::new();
        let mut root = global_console(&backend).await;
        let note = root
            .dispatch(Command::CreateStation {
                fields: StationFields::new("North", ""),
            })
            .await;
        assert_eq!(note, Notification::error("Please select an organization"));
    }
}
