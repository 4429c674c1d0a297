//! Subcommand implementations.

pub mod config;
pub mod generate;
pub mod generators;
