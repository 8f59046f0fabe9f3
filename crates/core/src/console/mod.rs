//! Admin console
//!
//! The auth gate decides whether a connection may open the console; the
//! controller then loads the four lists, executes commands against the
//! façade and produces views.

mod command;
mod controller;
mod gate;
mod guard;
mod scope;
mod state;
mod view;

pub use command::{Command, Level, Notification};
pub use controller::AdminConsole;
pub use gate::{AuthGate, GateOutcome, CHECKING_MESSAGE, DEFAULT_AUTH_TIMEOUT};
pub use guard::{check_organization_delete, check_station_delete, check_user_delete, DeleteBlocked};
pub use scope::{Principal, Scope, Scoped};
pub use state::ConsoleState;
pub use view::{Card, ConsoleView, ListView, SelectOption};
