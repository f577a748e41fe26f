use crate::core::Pipeline;
use crate::domain::model::UpdateOutcome;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<UpdateOutcome> {
        tracing::info!("Starting schedule update");
        let started = Instant::now();

        // Extract
        let phase = Instant::now();
        let sources = self.pipeline.extract().await?;
        tracing::info!(
            "Fetched {} sources in {:?}",
            sources.len(),
            phase.elapsed()
        );
        self.monitor.log_phase("extract");

        // Transform
        let phase = Instant::now();
        let result = self.pipeline.transform(sources).await?;
        tracing::info!(
            "Extracted {} sessions (hash {}) in {:?}",
            result.data.sessions.len(),
            result.hash,
            phase.elapsed()
        );
        self.monitor.log_phase("transform");

        // Load
        let phase = Instant::now();
        let outcome = self.pipeline.load(result).await?;
        tracing::info!("Load finished in {:?}", phase.elapsed());
        self.monitor.log_phase("load");

        match &outcome {
            UpdateOutcome::UpToDate { hash } => {
                tracing::info!("Data unchanged since last run ({}), nothing to publish", hash)
            }
            UpdateOutcome::Shown { failures } => {
                tracing::info!("Printed document, {} check failures", failures)
            }
            UpdateOutcome::Published {
                sessions_filename,
                failures,
            } => tracing::info!(
                "Published {} with {} check failures",
                sessions_filename,
                failures
            ),
        }
        tracing::info!("Update run took {:?}", started.elapsed());
        self.monitor.log_final();

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        CheckResult, JsonDataSource, JsonDataSources, ManifestData, ScheduleData, TransformResult,
    };
    use crate::utils::error::EtlError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        fail_load: bool,
        calls: AtomicUsize,
    }

    impl StubPipeline {
        fn new(fail_load: bool) -> Self {
            Self {
                fail_load,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<JsonDataSources> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut sources = JsonDataSources::new();
            sources.put(JsonDataSource::new("topics"));
            Ok(sources)
        }

        async fn transform(&self, sources: JsonDataSources) -> Result<TransformResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(sources.len(), 1);
            Ok(TransformResult {
                data: ScheduleData::default(),
                hash: "abc".to_string(),
                up_to_date: true,
                manifest: ManifestData {
                    major_version: 1,
                    minor_version: 1,
                    sessions_filename: "session_data_v1.1.json".to_string(),
                    data_files: vec![],
                    previous_files: vec![],
                },
                check: CheckResult::default(),
            })
        }

        async fn load(&self, result: TransformResult) -> Result<UpdateOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                return Err(EtlError::ValidationError {
                    message: "2 data check failures".to_string(),
                });
            }
            Ok(UpdateOutcome::UpToDate { hash: result.hash })
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = EtlEngine::new(StubPipeline::new(false));
        let outcome = engine.run().await.unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::UpToDate {
                hash: "abc".to_string()
            }
        );
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_engine_propagates_load_errors() {
        let engine = EtlEngine::new_with_monitoring(StubPipeline::new(true), true);
        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, EtlError::ValidationError { .. }));
    }
}
