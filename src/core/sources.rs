use crate::domain::keys;
use crate::domain::model::{JsonDataSource, JsonDataSources};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::collections::BTreeMap;

/// Loads the configured sources from local files or HTTP endpoints.
pub struct SourceLoader<'a, S: Storage> {
    storage: &'a S,
    client: &'a Client,
}

impl<'a, S: Storage> SourceLoader<'a, S> {
    pub fn new(storage: &'a S, client: &'a Client) -> Self {
        Self { storage, client }
    }

    /// Extra sources first, then the vendor export; a vendor source replaces an extra one of the same name.
    pub async fn load_all(&self, locations: &BTreeMap<String, String>) -> Result<JsonDataSources> {
        let mut sources = self.load_group(&keys::sources::EXTRA, locations).await?;
        let vendor = self.load_group(&keys::sources::VENDOR, locations).await?;
        sources.put_all(vendor);
        Ok(sources)
    }

    async fn load_group(
        &self,
        names: &[&str],
        locations: &BTreeMap<String, String>,
    ) -> Result<JsonDataSources> {
        let mut sources = JsonDataSources::new();
        for name in names {
            let Some(location) = locations.get(*name) else {
                tracing::warn!("Source '{}' is not configured, skipping", name);
                continue;
            };
            let source = self.load(name, location).await?;
            tracing::info!("Loaded {} elements from '{}'", source.len(), name);
            sources.put(source);
        }
        Ok(sources)
    }

    pub async fn load(&self, name: &str, location: &str) -> Result<JsonDataSource> {
        let bytes = if is_remote(location) {
            tracing::debug!("Fetching source '{}' from {}", name, location);
            let response = self.client.get(location).send().await?;
            tracing::debug!("Source '{}' response status: {}", name, response.status());
            response.error_for_status()?.bytes().await?.to_vec()
        } else {
            tracing::debug!("Reading source '{}' from {}", name, location);
            self.storage.read_file(location).await?
        };

        let value = serde_json::from_slice(&bytes).map_err(|e| EtlError::SourceError {
            source_name: name.to_string(),
            message: format!("invalid JSON from {}: {}", location, e),
        })?;
        JsonDataSource::from_value(name, value)
    }
}

pub fn is_remote(location: &str) -> bool {
    url::Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
