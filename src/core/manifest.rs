//! Manifest versioning and change detection.

use crate::config::toml_config::ManifestConfig;
use crate::domain::model::{Manifest, ManifestData, ScheduleData};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 of the serialized document, hex encoded.
pub fn content_hash(data: &ScheduleData) -> Result<String> {
    let bytes = serde_json::to_vec(data)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Matches sessions files named `{prefix}{major}.{minor}.json`.
#[derive(Debug, Clone)]
pub struct SessionsFilePattern {
    prefix: String,
    regex: Regex,
}

impl SessionsFilePattern {
    pub fn new(prefix: &str) -> Result<Self> {
        let pattern = format!(r"^{}(\d+)\.(\d+)\.json$", regex::escape(prefix));
        let regex = Regex::new(&pattern).map_err(|e| EtlError::InvalidConfigValueError {
            field: "manifest.sessions_prefix".to_string(),
            value: prefix.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }

    /// `None` when the name does not match or a version overflows.
    pub fn versions(&self, filename: &str) -> Option<(u32, u32)> {
        let caps = self.regex.captures(filename)?;
        Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
    }

    pub fn filename(&self, major: u32, minor: u32) -> String {
        format!("{}{}.{}.json", self.prefix, major, minor)
    }
}

/// Derives the next sessions filename and file list from the published manifest.
///
/// A missing or malformed manifest starts over at the configured major version.
pub fn extract_manifest_data(current: Option<&Value>, config: &ManifestConfig) -> Result<ManifestData> {
    let pattern = SessionsFilePattern::new(&config.sessions_prefix)?;
    let mut major_version = config.major_version;
    let mut minor_version = 0;
    let mut data_files = Vec::new();
    let mut previous_files = Vec::new();

    if let Some(manifest) = current {
        match read_data_files(manifest) {
            Some(files) => {
                let mut versions = None;
                for filename in &files {
                    if pattern.is_match(filename) {
                        versions = pattern.versions(filename);
                        if versions.is_none() {
                            break;
                        }
                    } else {
                        data_files.push(filename.clone());
                    }
                }
                match versions {
                    Some((major, minor)) => {
                        major_version = major;
                        minor_version = minor;
                        previous_files = files;
                    }
                    None if files.iter().any(|f| pattern.is_match(f)) => {
                        tracing::warn!(
                            "Ignoring existing manifest, as it seems to be badly formatted"
                        );
                        data_files.clear();
                    }
                    None => previous_files = files,
                }
            }
            None => {
                tracing::warn!("Ignoring existing manifest, as it seems to be badly formatted");
            }
        }
    }

    minor_version += 1;
    let sessions_filename = pattern.filename(major_version, minor_version);
    data_files.push(sessions_filename.clone());

    tracing::debug!(
        "Next sessions file is {} (manifest lists {} files)",
        sessions_filename,
        data_files.len()
    );

    Ok(ManifestData {
        major_version,
        minor_version,
        sessions_filename,
        data_files,
        previous_files,
    })
}

fn read_data_files(manifest: &Value) -> Option<Vec<String>> {
    manifest
        .get("data_files")?
        .as_array()?
        .iter()
        .map(|file| file.as_str().map(str::to_string))
        .collect()
}

pub fn build_manifest(config: &ManifestConfig, data: &ManifestData) -> Manifest {
    Manifest {
        format: config.format.clone(),
        data_files: data.data_files.clone(),
    }
}
