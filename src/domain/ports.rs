use crate::config::toml_config::ScheduleSettings;
use crate::domain::model::{JsonDataSources, TransformResult, UpdateOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Source name to file path or URL.
    fn source_locations(&self) -> &BTreeMap<String, String>;
    fn settings(&self) -> &ScheduleSettings;
    fn force(&self) -> bool;
    fn obfuscate(&self) -> bool;
    /// Print the document instead of publishing it.
    fn show(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<JsonDataSources>;
    async fn transform(&self, sources: JsonDataSources) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<UpdateOutcome>;
}
