//! The page roster — the client-visible, id-keyed page collection and the
//! controller that keeps it consistent with the remote registry.

pub mod controller;
pub mod validate;

pub use controller::{PageRoster, RosterError, RowState};
pub use validate::{normalize_url, InvalidUrl};
