//! Delete guards
//!
//! The store has no referential integrity, so deletes that would orphan
//! records are refused here. The loaded lists only hold what the admin may
//! see, so each check also takes the count of attached records in the store.
//! Both can race with other admins; that is accepted.

use thiserror::Error;

use super::state::ConsoleState;
use crate::model::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteBlocked {
    #[error("Cannot delete this station: {count} equipment item(s) are still assigned to it.")]
    StationHasEquipment { count: usize },

    #[error("Cannot delete this organization: {count} station(s) still belong to it.")]
    OrganizationHasStations { count: usize },

    #[error("You cannot delete your own account.")]
    OwnAccount,

    #[error("You cannot delete a {role} account.")]
    PeerAdmin { role: Role },
}

pub fn check_station_delete(
    state: &ConsoleState,
    station_id: &str,
    stored: usize,
) -> Result<(), DeleteBlocked> {
    match state.equipment_at(station_id).count().max(stored) {
        0 => Ok(()),
        count => Err(DeleteBlocked::StationHasEquipment { count }),
    }
}

pub fn check_organization_delete(
    state: &ConsoleState,
    organization_id: &str,
    stored: usize,
) -> Result<(), DeleteBlocked> {
    match state.stations_of(organization_id).count().max(stored) {
        0 => Ok(()),
        count => Err(DeleteBlocked::OrganizationHasStations { count }),
    }
}

/// An admin may not delete themselves, nor an admin of equal or higher rank.
pub fn check_user_delete(actor: &User, target: &User) -> Result<(), DeleteBlocked> {
    let same_identity = !actor.auth_id.is_empty() && actor.auth_id == target.auth_id;
    if actor.id == target.id || same_identity {
        return Err(DeleteBlocked::OwnAccount);
    }
    if target.role.is_admin() && target.role.rank() >= actor.role.rank() {
        return Err(DeleteBlocked::PeerAdmin {
            role: target.role.clone(),
        });
    }
    Ok(())
}
