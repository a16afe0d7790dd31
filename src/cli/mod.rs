//! CLI subcommand implementations for the Beacon binary.

pub mod list_cmd;
pub mod output;
pub mod refresh_cmd;
pub mod register_cmd;
pub mod remove_cmd;
