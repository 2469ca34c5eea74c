//! CLI command implementations

pub mod check;
pub mod config;
pub mod error;
pub mod output;
pub mod update;
