use crate::core::check::DataCheck;
use crate::core::extractor::{DataExtractor, ExtractOptions};
use crate::core::manifest::{self, SessionsFilePattern};
use crate::core::report;
use crate::core::sources::SourceLoader;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    CheckResult, DataSet, JsonDataSources, RunLog, TransformResult, UpdateOutcome,
};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::io::Write;

/// Reads sources through `input`; reads and publishes the dataset through `output`.
pub struct SchedulePipeline<S: Storage, C: ConfigProvider> {
    input: S,
    output: S,
    config: C,
    client: Client,
    now: Option<DateTime<Utc>>,
}

impl<S: Storage, C: ConfigProvider> SchedulePipeline<S, C> {
    pub fn new(input: S, output: S, config: C) -> Self {
        Self {
            input,
            output,
            config,
            client: Client::new(),
            now: None,
        }
    }

    /// Pins the clock used for time dependent fields such as livestream links.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// `None` when the file is absent or unparsable.
    async fn read_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        if !self.output.exists(path).await {
            return Ok(None);
        }
        let bytes = self.output.read_file(path).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", path, e);
                Ok(None)
            }
        }
    }

    async fn read_data_set(&self, path: &str) -> Result<DataSet> {
        let bytes = self.output.read_file(path).await?;
        DataSet::from_value(serde_json::from_slice(&bytes)?).map_err(|e| {
            EtlError::ProcessingError {
                message: format!("{}: {}", path, e),
            }
        })
    }

    async fn write_json<T: serde::Serialize>(&self, path: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        tracing::debug!("Writing {} ({} bytes)", path, json.len());
        self.output.write_file(path, &json).await
    }

    async fn write_reports(&self, check: &CheckResult) -> Result<String> {
        let base = &self.config.settings().manifest.report;
        let text_path = format!("{}.txt", base);
        self.output
            .write_file(&text_path, report::text_report(check).as_bytes())
            .await?;
        self.output
            .write_file(&format!("{}.csv", base), &report::csv_report(check)?)
            .await?;
        Ok(text_path)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SchedulePipeline<S, C> {
    async fn extract(&self) -> Result<JsonDataSources> {
        tracing::debug!("Loading sources relative to {}", self.config.input_path());
        SourceLoader::new(&self.input, &self.client)
            .load_all(self.config.source_locations())
            .await
    }

    async fn transform(&self, sources: JsonDataSources) -> Result<TransformResult> {
        let settings = self.config.settings();
        let options = ExtractOptions {
            obfuscate: self.config.obfuscate(),
            now: self.now(),
        };
        let data = DataExtractor::new(settings, options).extract(&sources)?;
        let hash = manifest::content_hash(&data)?;

        let last_run: Option<RunLog> = self.read_optional(&settings.manifest.run_log).await?;
        let up_to_date = last_run.as_ref().is_some_and(|run| run.hash == hash);

        let current_manifest: Option<serde_json::Value> =
            self.read_optional(&settings.manifest.filename).await?;
        let manifest_data =
            manifest::extract_manifest_data(current_manifest.as_ref(), &settings.manifest)?;

        if up_to_date && !self.config.force() {
            tracing::info!("Generated data matches the last run ({}), skipping checks", hash);
            return Ok(TransformResult {
                data,
                hash,
                up_to_date,
                manifest: manifest_data,
                check: CheckResult::default(),
            });
        }

        // old is everything currently published; new swaps in the fresh sessions file
        let pattern = SessionsFilePattern::new(&settings.manifest.sessions_prefix)?;
        let mut old = DataSet::new();
        let mut new = data.to_data_set()?;
        for filename in &manifest_data.previous_files {
            let published = self.read_data_set(filename).await?;
            if !pattern.is_match(filename) {
                new.merge(published.clone());
            }
            old.merge(published);
        }

        let check = DataCheck::new(settings).check(&old, &new)?;

        Ok(TransformResult {
            data,
            hash,
            up_to_date,
            manifest: manifest_data,
            check,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<UpdateOutcome> {
        let settings = self.config.settings();
        let forced = self.config.force();

        if result.up_to_date && !forced {
            return Ok(UpdateOutcome::UpToDate { hash: result.hash });
        }

        let failures = result.check.failures.len();
        if self.config.show() {
            print_document(&result)?;
            return Ok(UpdateOutcome::Shown { failures });
        }

        if failures > 0 {
            let report_path = self.write_reports(&result.check).await?;
            tracing::error!("{}", report::text_report(&result.check));

            if settings.check.halt_on_failure && !forced {
                return Err(EtlError::ValidationError {
                    message: format!(
                        "{} data check failures, see {}",
                        failures, report_path
                    ),
                });
            }
            tracing::warn!("Publishing despite {} data check failures", failures);
        }

        let manifest_data = &result.manifest;
        self.write_json(&manifest_data.sessions_filename, &result.data)
            .await?;
        self.write_json(
            &settings.manifest.filename,
            &manifest::build_manifest(&settings.manifest, manifest_data),
        )
        .await?;

        let run_log = RunLog {
            hash: result.hash,
            major_version: manifest_data.major_version,
            minor_version: manifest_data.minor_version,
            sessions_filename: manifest_data.sessions_filename.clone(),
            timestamp: self.now(),
            forced,
            counts: result.data.entity_counts(),
        };
        self.write_json(&settings.manifest.run_log, &run_log).await?;

        tracing::info!(
            "Published {} (v{}.{})",
            manifest_data.sessions_filename,
            manifest_data.major_version,
            manifest_data.minor_version
        );
        Ok(UpdateOutcome::Published {
            sessions_filename: manifest_data.sessions_filename.clone(),
            failures,
        })
    }
}

fn print_document(result: &TransformResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&result.data)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    if !result.check.is_ok() {
        writeln!(stdout, "{}", report::text_report(&result.check))?;
    }
    Ok(())
}
