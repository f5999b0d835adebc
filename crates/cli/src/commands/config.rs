//! Configuration file management

use std::path::PathBuf;

use anyhow::bail;
use clap::Subcommand;
use thyme_common::config::DEFAULT_CONFIG_FILE;
use thyme_common::ThymeConfig;
use tracing::info;

use crate::output::{self, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Where to write the file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Configuration file to read
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

pub fn execute(cmd: ConfigCommands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            ThymeConfig::default().save(&path)?;
            info!("Wrote default configuration to {}", path.display());
            output::print_success(&format!("Created {}", path.display()));
        }
        ConfigCommands::Show { path } => {
            let config = ThymeConfig::load(&path)?;
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&config)?,
                OutputFormat::Yaml => serde_yaml::to_string(&config)?,
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&config)?,
            };
            println!("{}", rendered);
        }
    }
    Ok(())
}
