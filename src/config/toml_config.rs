use crate::domain::keys;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    #[serde(default)]
    pub updater: RunConfig,
    pub sources: BTreeMap<String, String>,
    #[serde(flatten)]
    pub schedule: ScheduleSettings,
}

/// Paths and run flags; the CLI may override each of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_input_path")]
    pub input_path: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub obfuscate: bool,
    #[serde(default)]
    pub show: bool,
    #[serde(default)]
    pub monitor: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            force: false,
            obfuscate: false,
            show: false,
            monitor: false,
        }
    }
}

fn default_input_path() -> String {
    "./input".to_string()
}

fn default_output_path() -> String {
    "./data".to_string()
}

/// Everything the extractor and the data check need to know about the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub conference: ConferenceConfig,
    pub video: VideoConfig,
    pub urls: UrlConfig,
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub rooms: Vec<RoomMappingEntry>,
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceConfig {
    pub year: i32,
    /// Offset of the venue from UTC; vendor timestamps are venue-local.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    pub days: Vec<ConferenceDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceDay {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl ConferenceConfig {
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.days.first().map(|d| d.start.with_timezone(&Utc))
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.days.last().map(|d| d.end.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Vendor category id that marks a topic as video library content.
    pub category_id: String,
    /// Used for livestreamed sessions that have no stream id yet.
    #[serde(default)]
    pub livestream_url_for_empty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    pub session: String,
    pub session_photo: String,
    pub speaker_photo: String,
    #[serde(default = "default_plus_url")]
    pub plus_profile: String,
    #[serde(default = "default_twitter_url")]
    pub twitter_profile: String,
}

fn default_plus_url() -> String {
    "https://plus.google.com/{id}".to_string()
}

fn default_twitter_url() -> String {
    "https://twitter.com/{id}".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Tag categories whose tags may double as hashtags and video topics.
    #[serde(default = "default_hashtag_categories")]
    pub hashtag_categories: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            hashtag_categories: default_hashtag_categories(),
        }
    }
}

fn default_hashtag_categories() -> Vec<String> {
    vec!["TOPIC".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMappingEntry {
    pub id: String,
    #[serde(default)]
    pub original_ids: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub captions_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_filename")]
    pub filename: String,
    #[serde(default = "default_manifest_format")]
    pub format: String,
    #[serde(default = "default_major_version")]
    pub major_version: u32,
    #[serde(default = "default_sessions_prefix")]
    pub sessions_prefix: String,
    #[serde(default = "default_run_log")]
    pub run_log: String,
    #[serde(default = "default_report")]
    pub report: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            filename: default_manifest_filename(),
            format: default_manifest_format(),
            major_version: default_major_version(),
            sessions_prefix: default_sessions_prefix(),
            run_log: default_run_log(),
            report: default_report(),
        }
    }
}

fn default_manifest_filename() -> String {
    "manifest_v1.json".to_string()
}

fn default_manifest_format() -> String {
    "iosched-json-v1".to_string()
}

fn default_major_version() -> u32 {
    1
}

fn default_sessions_prefix() -> String {
    "session_data_v".to_string()
}

fn default_run_log() -> String {
    "last_run.json".to_string()
}

fn default_report() -> String {
    "data_check_report".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Refuse to publish when the data check reports failures (unless forced).
    #[serde(default = "default_true")]
    pub halt_on_failure: bool,
    #[serde(default = "default_max_session_hours")]
    pub max_session_hours: i64,
    /// A collection shrinking below this share of its previous size is reported.
    #[serde(default = "default_min_size_percent")]
    pub min_size_percent: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            halt_on_failure: true,
            max_session_hours: default_max_session_hours(),
            min_size_percent: default_min_size_percent(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_session_hours() -> i64 {
    6
}

fn default_min_size_percent() -> usize {
    80
}

impl ScheduleSettings {
    /// Canonical room id for a vendor room id; unmapped ids pass through.
    pub fn room_id(&self, original_id: &str) -> String {
        self.rooms
            .iter()
            .find(|room| room.original_ids.iter().any(|id| id == original_id))
            .map(|room| room.id.clone())
            .unwrap_or_else(|| original_id.to_string())
    }

    pub fn room_title(&self, room_id: &str, fallback: &str) -> String {
        self.rooms
            .iter()
            .find(|room| room.id == room_id)
            .and_then(|room| room.title.clone())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn room_captions(&self, room_id: &str) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| room.id == room_id)
            .and_then(|room| room.captions_url.as_deref())
    }

    pub fn is_hashtag_category(&self, category: &str) -> bool {
        self.tags.hashtag_categories.iter().any(|c| c == category)
    }
}

impl UpdaterConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("updater.input_path", &self.updater.input_path)?;
        validation::validate_path("updater.output_path", &self.updater.output_path)?;

        if self.sources.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "sources".to_string(),
            });
        }
        let known: Vec<&str> = keys::sources::VENDOR
            .iter()
            .chain(keys::sources::EXTRA.iter())
            .copied()
            .collect();
        for (name, location) in &self.sources {
            if !known.contains(&name.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "sources".to_string(),
                    value: name.clone(),
                    reason: format!("Unknown source. Known sources: {}", known.join(", ")),
                });
            }
            validation::validate_source_location(&format!("sources.{}", name), location)?;
        }

        let conference = &self.schedule.conference;
        validation::validate_range("conference.year", conference.year, 2000, 2100)?;
        validation::validate_range(
            "conference.utc_offset_minutes",
            conference.utc_offset_minutes,
            -14 * 60,
            14 * 60,
        )?;
        if conference.days.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "conference.days".to_string(),
            });
        }
        for (i, day) in conference.days.iter().enumerate() {
            if day.start >= day.end {
                return Err(EtlError::InvalidConfigValueError {
                    field: format!("conference.days[{}]", i),
                    value: format!("{} .. {}", day.start, day.end),
                    reason: "Day must start before it ends".to_string(),
                });
            }
        }

        validation::validate_non_empty_string("video.category_id", &self.schedule.video.category_id)?;
        if let Some(url) = &self.schedule.video.livestream_url_for_empty {
            validation::validate_url("video.livestream_url_for_empty", url)?;
        }

        let urls = &self.schedule.urls;
        validation::validate_url_template("urls.session", &urls.session)?;
        validation::validate_url_template("urls.session_photo", &urls.session_photo)?;
        validation::validate_url_template("urls.speaker_photo", &urls.speaker_photo)?;
        validation::validate_url_template("urls.plus_profile", &urls.plus_profile)?;
        validation::validate_url_template("urls.twitter_profile", &urls.twitter_profile)?;

        for room in &self.schedule.rooms {
            validation::validate_non_empty_string("rooms.id", &room.id)?;
        }

        let manifest = &self.schedule.manifest;
        validation::validate_path("manifest.filename", &manifest.filename)?;
        validation::validate_non_empty_string("manifest.sessions_prefix", &manifest.sessions_prefix)?;

        let check = &self.schedule.check;
        validation::validate_range("check.max_session_hours", check.max_session_hours, 1, 24)?;
        validation::validate_range("check.min_size_percent", check.min_size_percent, 0, 100)?;

        Ok(())
    }
}

impl ConfigProvider for UpdaterConfig {
    fn input_path(&self) -> &str {
        &self.updater.input_path
    }

    fn output_path(&self) -> &str {
        &self.updater.output_path
    }

    fn source_locations(&self) -> &BTreeMap<String, String> {
        &self.sources
    }

    fn settings(&self) -> &ScheduleSettings {
        &self.schedule
    }

    fn force(&self) -> bool {
        self.updater.force
    }

    fn obfuscate(&self) -> bool {
        self.updater.obfuscate
    }

    fn show(&self) -> bool {
        self.updater.show
    }
}

impl Validate for UpdaterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
