//! Command line interface

use clap::Parser;
use jogkit_settings::{Config, SettingsResult};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "jogkit",
    version,
    about = "Jog a GRBL machine from the keyboard, one command at a time"
)]
pub struct Cli {
    /// Serial port: a number (3 -> COM3), COMn, or a device path
    pub port: Option<String>,

    /// Configuration file (JSON or TOML)
    #[arg(short, long, env = "JOGKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive, e.g. "debug" or "jogkit_communication=trace"
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// List serial ports that look like controllers and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Do not send the soft reset / unlock sequence after connecting
    #[arg(long)]
    pub skip_startup: bool,
}

impl Cli {
    /// Load the configuration and apply the logging flags.
    ///
    /// Without `--config` the per-user file is used when it exists. The port
    /// override is applied separately so the change can be logged.
    pub fn load_config(&self) -> SettingsResult<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::load_or_default(&Config::default_path()?)?,
        };

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }

        Ok(config)
    }
}
