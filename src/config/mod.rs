#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::UpdaterConfig;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "schedule-updater")]
#[command(about = "Converts vendor CMS exports into the published conference schedule")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "schedule-updater.toml")]
    pub config: String,

    /// Directory the relative source paths are resolved against
    #[arg(long)]
    pub input_path: Option<String>,

    /// Directory holding the manifest and the published data files
    #[arg(long)]
    pub output_path: Option<String>,

    /// Publish even when unchanged or when the data check fails
    #[arg(long)]
    pub force: bool,

    /// Replace names and descriptions with placeholder text
    #[arg(long)]
    pub obfuscate: bool,

    /// Print the generated document to stdout instead of publishing it
    #[arg(long)]
    pub show: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Command line flags win over the file; flags only ever switch behaviour on.
    pub fn apply_overrides(&self, config: &mut UpdaterConfig) {
        if let Some(input_path) = &self.input_path {
            config.updater.input_path = input_path.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.updater.output_path = output_path.clone();
        }
        config.updater.force |= self.force;
        config.updater.obfuscate |= self.obfuscate;
        config.updater.show |= self.show;
        config.updater.monitor |= self.monitor;
    }
}
