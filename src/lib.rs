pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::UpdaterConfig;
pub use core::{etl::EtlEngine, pipeline::SchedulePipeline};
pub use domain::model::{ScheduleData, UpdateOutcome};
pub use utils::error::{EtlError, Result};
