//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::{classify::ClassifyArgs, steps::StepsArgs, validate::ValidateArgs};

#[derive(Parser)]
#[command(name = "jbi")]
#[command(about = "JBI - Bugzilla to Jira action runner", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Settings file (defaults to config/jbi.yaml)
    #[arg(short, long, global = true, env = "JBI_SETTINGS_FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the settings and actions file and report any error
    Validate(ValidateArgs),

    /// List the available steps and the collaborators they use
    Steps(StepsArgs),

    /// Show which action and operation a webhook payload would get
    Classify(ClassifyArgs),
}
