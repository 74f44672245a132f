//! Session module
//!
//! Connection lifecycle state and the settings that flow into it.
//!
//! `Disconnected -> Connecting -> Connected -> Disconnected`: Connect
//! resets the session, validates, checks API access, and only then marks it
//! connected. Disconnect always succeeds.

mod state;
mod types;

pub use state::Session;
pub use types::{FormSettings, Settings, WriteSettings};
