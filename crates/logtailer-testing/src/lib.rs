//! Testing infrastructure for logtailer integration tests.
//!
//! - `TestWorld`: isolated data directory plus CLI execution
//! - `fixtures`: sample tabs and entries, and a way to seed a store with them
//! - `assertions`: checks over the CLI's JSON output

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::{CliResult, TestWorld};
