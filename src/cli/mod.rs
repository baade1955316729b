//! CLI module for the ci-stack tool.
//!
//! This module provides the command-line interface for validating
//! deployment parameters and rendering provisioning plans.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
