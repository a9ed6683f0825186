//! Helpers CLI - Command-line interface for the agent helpers
//!
//! This crate provides the `helpers` binary that exposes every adapter operation.

pub mod config;

pub use config::{Command, Config, SortDirection, SortField};
