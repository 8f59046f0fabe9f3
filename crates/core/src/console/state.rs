//! In-memory console data

use serde::Serialize;

use crate::model::{Entity, Equipment, Organization, Station, User};

/// The four lists a console works on. Owned by one console instance and
/// only changed through its methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleState {
    pub users: Vec<User>,
    pub organizations: Vec<Organization>,
    pub stations: Vec<Station>,
    pub equipment: Vec<Equipment>,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        find(&self.users, id)
    }

    pub fn organization(&self, id: &str) -> Option<&Organization> {
        find(&self.organizations, id)
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        find(&self.stations, id)
    }

    pub fn equipment_item(&self, id: &str) -> Option<&Equipment> {
        find(&self.equipment, id)
    }

    pub fn organization_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.organization(id))
            .map(|org| org.name.as_str())
    }

    pub fn station_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.station(id))
            .map(|station| station.name.as_str())
    }

    pub fn stations_of<'a>(
        &'a self,
        organization_id: &'a str,
    ) -> impl Iterator<Item = &'a Station> + 'a {
        self.stations
            .iter()
            .filter(move |station| station.organization_id == organization_id)
    }

    pub fn equipment_at<'a>(
        &'a self,
        station_id: &'a str,
    ) -> impl Iterator<Item = &'a Equipment> + 'a {
        self.equipment
            .iter()
            .filter(move |item| item.station_id == station_id)
    }

    pub fn put_user(&mut self, user: User) {
        upsert(&mut self.users, user);
    }

    pub fn put_organization(&mut self, organization: Organization) {
        upsert(&mut self.organizations, organization);
    }

    pub fn put_station(&mut self, station: Station) {
        upsert(&mut self.stations, station);
    }

    pub fn put_equipment(&mut self, item: Equipment) {
        upsert(&mut self.equipment, item);
    }

    pub fn remove_user(&mut self, id: &str) -> Option<User> {
        remove(&mut self.users, id)
    }

    pub fn remove_organization(&mut self, id: &str) -> Option<Organization> {
        remove(&mut self.organizations, id)
    }

    pub fn remove_station(&mut self, id: &str) -> Option<Station> {
        remove(&mut self.stations, id)
    }

    pub fn remove_equipment(&mut self, id: &str) -> Option<Equipment> {
        remove(&mut self.equipment, id)
    }
}

fn find<'a, T: Entity>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Replace in place, or append when new.
fn upsert<T: Entity>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

fn remove<T: Entity>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}
