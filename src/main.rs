use clap::Parser;
use schedule_updater::utils::error::{EtlError, ErrorSeverity};
use schedule_updater::utils::{logger, validation::Validate};
use schedule_updater::{
    CliConfig, EtlEngine, LocalStorage, SchedulePipeline, UpdateOutcome, UpdaterConfig,
};

fn exit_code(error: &EtlError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(stage: &str, error: &EtlError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        error,
        error.category(),
        error.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(exit_code(error));
}

fn load_config(cli: &CliConfig) -> schedule_updater::Result<UpdaterConfig> {
    let mut config = UpdaterConfig::from_file(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting schedule-updater");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => report_failure("Configuration", &e),
    };

    let monitor_enabled = config.updater.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let input = LocalStorage::new(config.updater.input_path.clone());
    let output = LocalStorage::new(config.updater.output_path.clone());
    let pipeline = SchedulePipeline::new(input, output, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(UpdateOutcome::UpToDate { hash }) => {
            eprintln!("✅ Already up to date ({})", hash);
        }
        Ok(UpdateOutcome::Shown { failures }) => {
            eprintln!("✅ Document printed, {} data check failures", failures);
        }
        Ok(UpdateOutcome::Published {
            sessions_filename,
            failures,
        }) => {
            eprintln!("✅ Published {}", sessions_filename);
            if failures > 0 {
                eprintln!("⚠️  {} data check failures were ignored", failures);
            }
        }
        Err(e) => report_failure("Schedule update", &e),
    }

    Ok(())
}
