//! The persisted page registry — records and the CRUD client.

pub mod client;
pub mod types;

pub use client::{RegistryClient, RegistryError};
pub use types::{NewPage, PageRecord, ScorePatch, Strategy};
