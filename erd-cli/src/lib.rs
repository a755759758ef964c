//! # ERD Canvas CLI
//!
//! File I/O host for the ERD editing engine.
//!
//! ## Usage
//!
//! ```bash
//! erd convert school.erd -o school.json
//! erd render school.json -o school.svg
//! erd check school.erd
//! erd replay school.json session-events.json -o edited.json
//! ```
//!
//! Inputs ending in `.json` are persisted documents; anything else is read as
//! a declarative script.
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved paths, overrides and the subcommand to run
//! - `commands` - One function per subcommand, all returning `anyhow::Result`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use erd_core::EditorConfig;

/// Command-line arguments for erd.
#[derive(Debug, Clone, Parser)]
#[command(name = "erd")]
#[command(about = "Entity-relationship diagram tool")]
#[command(version)]
pub struct CliArgs {
    /// Editor configuration file (JSON)
    #[arg(long, global = true, env = "ERD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Grid size override in document units
    #[arg(long, global = true, env = "ERD_GRID_SIZE")]
    pub grid_size: Option<f32>,

    /// Rendered surface width in pixels
    #[arg(long, global = true, default_value = "1200")]
    pub width: u32,

    /// Rendered surface height in pixels
    #[arg(long, global = true, default_value = "800")]
    pub height: u32,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Render a diagram to SVG
    Render {
        /// Document or script
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a script (or document) to a JSON document
    Convert {
        /// Document or script
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print shape/edge counts and any problems
    Check {
        /// Document or script
        input: PathBuf,
    },
    /// Feed recorded input events through the editor
    Replay {
        /// Document or script to start from
        input: PathBuf,
        /// JSON array of editor events
        events: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Editor configuration file, if any.
    pub config_path: Option<PathBuf>,
    /// Grid size override.
    pub grid_size: Option<f32>,
    /// Rendered surface width in pixels.
    pub width: u32,
    /// Rendered surface height in pixels.
    pub height: u32,
    /// Subcommand to run.
    pub command: Command,
}

impl CliConfig {
    /// Build the editor configuration: defaults, then the config file, then
    /// command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn editor_config(&self) -> anyhow::Result<EditorConfig> {
        let mut config = match &self.config_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                EditorConfig::from_json(&json)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => EditorConfig::default(),
        };
        if let Some(grid) = self.grid_size {
            anyhow::ensure!(grid > 0.0, "Grid size must be positive, got {grid}");
            config.grid_size = grid;
        }
        Ok(config)
    }
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            config_path: args.config,
            grid_size: args.grid_size,
            width: args.width,
            height: args.height,
            command: args.command,
        }
    }
}
