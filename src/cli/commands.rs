//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ci-stack - Resolve and plan a Jenkins CI cloud stack.
#[derive(Parser, Debug)]
#[command(name = "ci-stack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the deployment parameters file.
    #[arg(short, long, global = true, env = "CI_STACK_PARAMS")]
    pub params: Option<PathBuf>,

    /// Context parameter as key=value (repeatable).
    #[arg(short = 'c', long = "context", global = true, value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    /// Path to a custom agent catalog file.
    #[arg(long, global = true, env = "CI_STACK_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a template parameters file.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate parameters and show the resolved configuration.
    Validate {
        /// Show warnings as well as the summary.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Resolve parameters and display the provisioning plan.
    Plan {
        /// Show the inputs of every step.
        #[arg(short, long)]
        detailed: bool,
    },

    /// List agent catalog entries.
    Catalog {
        /// Only show entries selected for this deployment type.
        #[arg(short = 't', long)]
        deployment_type: Option<String>,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
