//! # Paw Rescue CLI
//!
//! Native host for the Paw Rescue core: browse adoptable pets, campaigns and
//! partner shelters, and file an injury report from a photo on disk.
//!
//! ## Usage
//!
//! ```bash
//! paw-rescue pets --kind dog
//! paw-rescue campaigns --featured 2
//! paw-rescue report --photo stray.jpg --lat 17.6868 --lon 83.2185 --phone 9876543210
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliArgs::load_config` - JSON config file with CLI overrides on top
//! - `devices` - Still-image camera and fixed position source
//! - `commands` - Subcommand execution and text/JSON rendering

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;
pub mod devices;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rescue_core::{PetKind, RescueConfig};

/// Command-line arguments for paw-rescue.
#[derive(Debug, Clone, Parser)]
#[command(name = "paw-rescue")]
#[command(about = "Report injured animals and find pets to adopt in Visakhapatnam")]
#[command(version)]
pub struct CliArgs {
    /// JSON configuration file
    #[arg(long, global = true, env = "PAW_RESCUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Simulated backend latency in milliseconds (reports and listings)
    #[arg(long, global = true, env = "PAW_RESCUE_LATENCY_MS")]
    pub latency_ms: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List pets open for adoption
    Pets {
        /// Match name, breed or description
        #[arg(long, default_value = "")]
        search: String,

        /// all, dog or cat
        #[arg(long, default_value = "all")]
        kind: PetKind,

        /// Show only the first N matches
        #[arg(long)]
        featured: Option<usize>,
    },

    /// List fundraising campaigns
    Campaigns {
        /// Show only the first N campaigns
        #[arg(long)]
        featured: Option<usize>,
    },

    /// List partner shelters
    Shelters,

    /// Report an injured animal
    Report(ReportArgs),
}

/// Arguments for `paw-rescue report`.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Photo of the animal
    #[arg(long)]
    pub photo: PathBuf,

    /// Attach the file as-is instead of capturing it through the camera path
    #[arg(long)]
    pub upload: bool,

    /// Latitude of the animal
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the animal
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Phone number rescuers can call
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Your name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Condition of the animal and landmarks
    #[arg(long, default_value = "")]
    pub description: String,

    /// Make the simulated backend reject the report
    #[arg(long)]
    pub fail: bool,
}

impl CliArgs {
    /// Build the effective configuration: defaults, then the config file,
    /// then command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_config(&self) -> anyhow::Result<RescueConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                RescueConfig::from_json(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => RescueConfig::default(),
        };

        if let Some(ms) = self.latency_ms {
            config.api.report_latency_ms = ms;
            config.api.listing_latency_ms = ms;
        }
        if let Command::Report(report) = &self.command {
            config.api.fail_reports |= report.fail;
        }
        Ok(config)
    }
}
