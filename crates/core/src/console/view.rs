//! Serializable views of the console lists

use serde::Serialize;

use super::scope::Principal;
use super::state::ConsoleState;
use crate::model::{Equipment, Organization, Station, User};

pub const NO_ORGANIZATIONS: &str =
    "No organizations yet. Click \"Add Organization\" to create one.";
pub const NO_STATIONS: &str = "No stations yet. Click \"Add Station\" to create one.";
pub const NO_EQUIPMENT: &str = "No equipment yet. Click \"Add Equipment\" to create one.";
pub const NO_USERS: &str = "No users yet.";

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub lines: Vec<String>,
    pub active: bool,
    pub badge: &'static str,
    /// Name used in the delete confirmation.
    pub label: String,
}

impl Card {
    fn new(id: &str, title: impl Into<String>, active: bool) -> Self {
        let title = title.into();
        Self {
            id: id.to_string(),
            label: title.clone(),
            title,
            lines: Vec::new(),
            active,
            badge: if active { "Active" } else { "Inactive" },
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub cards: Vec<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl ListView {
    fn new(cards: Vec<Card>, empty_message: &'static str) -> Self {
        let empty_message = cards.is_empty().then_some(empty_message);
        Self {
            cards,
            empty_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn placeholder(label: &str) -> Self {
        Self {
            value: String::new(),
            label: label.to_string(),
        }
    }
}

/// Everything the console page renders after the gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleView {
    pub user_email: String,
    pub role: String,
    pub organizations: ListView,
    pub stations: ListView,
    pub equipment: ListView,
    pub users: ListView,
    pub organization_options: Vec<SelectOption>,
    pub station_options: Vec<SelectOption>,
}

impl ConsoleView {
    pub fn build(principal: &Principal, state: &ConsoleState) -> Self {
        Self {
            user_email: principal.auth.email.clone(),
            role: principal.role().to_string(),
            organizations: ListView::new(
                state.organizations.iter().map(organization_card).collect(),
                NO_ORGANIZATIONS,
            ),
            stations: ListView::new(
                state
                    .stations
                    .iter()
                    .map(|station| station_card(station, state))
                    .collect(),
                NO_STATIONS,
            ),
            equipment: ListView::new(
                state
                    .equipment
                    .iter()
                    .map(|item| equipment_card(item, state))
                    .collect(),
                NO_EQUIPMENT,
            ),
            users: ListView::new(
                state.users.iter().map(|user| user_card(user, state)).collect(),
                NO_USERS,
            ),
            organization_options: organization_options(&state.organizations),
            station_options: station_options(&state.stations),
        }
    }
}

fn organization_card(org: &Organization) -> Card {
    Card::new(&org.id, org.name.as_str(), org.active)
        .line(org.contact_email.as_deref().unwrap_or("No email"))
        .line(org.phone.as_deref().unwrap_or("No phone"))
}

fn station_card(station: &Station, state: &ConsoleState) -> Card {
    let mut card = Card::new(&station.id, station.name.as_str(), station.active).line(
        state
            .organization_name(Some(&station.organization_id))
            .unwrap_or("Unknown Org"),
    );
    if let Some(code) = &station.code {
        card = card.line(format!("Code: {}", code));
    }
    card.line(station.location.as_deref().unwrap_or("No location"))
}

fn equipment_card(item: &Equipment, state: &ConsoleState) -> Card {
    let mut card = Card::new(&item.id, item.equipment_id.as_str(), item.active)
        .line(
            state
                .station_name(Some(&item.station_id))
                .unwrap_or("Unknown Station"),
        )
        .line(item.equipment_type.as_deref().unwrap_or("No type"));
    if let Some(status) = &item.status {
        card = card.line(format!("Status: {}", status));
    }
    if let Some(date) = item.last_service {
        card = card.line(format!("Last service: {}", date.format("%Y-%m-%d")));
    }
    card.line(item.notes.as_deref().unwrap_or("No notes"))
}

fn user_card(user: &User, state: &ConsoleState) -> Card {
    let mut card = Card::new(&user.id, user.display_name(), user.active)
        .label(user.email.as_str())
        .line(user.email.as_str())
        .line(format!("Role: {}", user.role));
    if let Some(org) = state.organization_name(user.organization_id.as_deref()) {
        card = card.line(org);
    }
    if let Some(station) = state.station_name(user.station_id.as_deref()) {
        card = card.line(station);
    }
    card
}

pub fn organization_options(organizations: &[Organization]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::placeholder("Select Organization"))
        .chain(organizations.iter().map(|org| SelectOption {
            value: org.id.clone(),
            label: org.name.clone(),
        }))
        .collect()
}

pub fn station_options(stations: &[Station]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::placeholder("Select Station"))
        .chain(stations.iter().map(|station| SelectOption {
            value: station.id.clone(),
            label: station.name.clone(),
        }))
        .collect()
}
