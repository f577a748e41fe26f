use crate::domain::keys::{self, MainType};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub type JsonObject = Map<String, Value>;

/// One vendor or auxiliary export, indexed by element id.
#[derive(Debug, Clone, Default)]
pub struct JsonDataSource {
    name: String,
    id_key: &'static str,
    elements: Vec<JsonObject>,
    index: HashMap<String, usize>,
}

impl JsonDataSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id_key: keys::sources::id_key(name),
            elements: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Accepts an array of objects, an object wrapping such an array, or a keyed map of objects.
    pub fn from_value(name: &str, value: Value) -> Result<Self> {
        let mut source = Self::new(name);
        let source_error = |message: &str| EtlError::SourceError {
            source_name: name.to_string(),
            message: message.to_string(),
        };

        match value {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Object(obj) => source.add_element(obj),
                        _ => return Err(source_error("array elements must be objects")),
                    }
                }
            }
            Value::Object(obj) => {
                let wrapped = obj.values().find_map(|v| match v {
                    Value::Array(items) if items.iter().all(Value::is_object) => Some(items.clone()),
                    _ => None,
                });
                if let Some(items) = wrapped {
                    for item in items {
                        if let Value::Object(obj) = item {
                            source.add_element(obj);
                        }
                    }
                } else if obj.values().all(Value::is_object) {
                    for (key, item) in obj {
                        if let Value::Object(mut element) = item {
                            element
                                .entry(source.id_key.to_string())
                                .or_insert(Value::String(key));
                            source.add_element(element);
                        }
                    }
                } else {
                    return Err(source_error(
                        "expected an array of objects or a map of objects",
                    ));
                }
            }
            _ => return Err(source_error("expected a JSON array or object")),
        }

        Ok(source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_element(&mut self, element: JsonObject) {
        if let Some(id) = element.get(self.id_key).and_then(id_as_string) {
            self.index.insert(id, self.elements.len());
        }
        self.elements.push(element);
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&JsonObject> {
        self.index.get(id).map(|&pos| &self.elements[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsonObject> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Deserializes every element into a typed record.
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.elements
            .iter()
            .map(|element| {
                serde_json::from_value(Value::Object(element.clone())).map_err(|e| {
                    EtlError::SourceError {
                        source_name: self.name.clone(),
                        message: format!("malformed element: {}", e),
                    }
                })
            })
            .collect()
    }

    pub fn record_by_id<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        match self.get_element_by_id(id) {
            Some(element) => serde_json::from_value(Value::Object(element.clone()))
                .map(Some)
                .map_err(|e| EtlError::SourceError {
                    source_name: self.name.clone(),
                    message: format!("malformed element '{}': {}", id, e),
                }),
            None => Ok(None),
        }
    }
}

pub fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonDataSources {
    sources: BTreeMap<String, JsonDataSource>,
}

impl JsonDataSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, source: JsonDataSource) {
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn put_all(&mut self, other: JsonDataSources) {
        self.sources.extend(other.sources);
    }

    pub fn get_source(&self, name: &str) -> Option<&JsonDataSource> {
        self.sources.get(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub original_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
    pub name: String,
    pub category: String,
    pub original_id: String,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_in_category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtag: Option<String>,
    #[serde(rename = "photoUrl", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "thumbnailUrl", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "plusoneUrl", skip_serializing_if = "Option::is_none")]
    pub plusone_url: Option<String>,
    #[serde(rename = "twitterUrl", skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedContent {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<String>,
    pub is_featured: bool,
    pub is_livestream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_content: Option<Vec<RelatedContent>>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtag: Option<String>,
    pub speakers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLibraryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vid: Option<String>,
    #[serde(rename = "thumbnailUrl", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub speakers: String,
}

/// The normalized document published to the apps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleData {
    pub rooms: Vec<Room>,
    pub video_library: Vec<VideoLibraryEntry>,
    pub sessions: Vec<Session>,
    pub speakers: Vec<Speaker>,
    pub tags: Vec<Tag>,
}

impl ScheduleData {
    pub fn to_data_set(&self) -> Result<DataSet> {
        DataSet::from_value(serde_json::to_value(self)?)
    }

    pub fn entity_counts(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            (MainType::Rooms.to_string(), self.rooms.len()),
            (MainType::VideoLibrary.to_string(), self.video_library.len()),
            (MainType::Sessions.to_string(), self.sessions.len()),
            (MainType::Speakers.to_string(), self.speakers.len()),
            (MainType::Tags.to_string(), self.tags.len()),
        ])
    }
}

/// Untyped view of one or more published data files: collection name to entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    collections: BTreeMap<String, Vec<Value>>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(obj) = value else {
            return Err(EtlError::ProcessingError {
                message: "data file must be a JSON object".to_string(),
            });
        };
        let mut collections = BTreeMap::new();
        for (key, entry) in obj {
            match entry {
                Value::Array(items) => {
                    collections.insert(key, items);
                }
                _ => {
                    return Err(EtlError::ProcessingError {
                        message: format!("collection '{}' is not an array", key),
                    })
                }
            }
        }
        Ok(Self { collections })
    }

    /// Appends every collection of `other`, concatenating collections present in both.
    pub fn merge(&mut self, other: DataSet) {
        for (key, items) in other.collections {
            self.collections.entry(key).or_default().extend(items);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Vec<Value>> {
        self.collections.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Value>)> {
        self.collections.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub entity: String,
    pub entity_id: Option<String>,
    pub reason: String,
}

impl CheckFailure {
    pub fn new(entity: impl Into<String>, entity_id: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            entity_id,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entity)?;
        if let Some(id) = &self.entity_id {
            write!(f, " {}", id)?;
        }
        write!(f, " {}", self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub failures: Vec<CheckFailure>,
}

impl CheckResult {
    pub fn push(&mut self, failure: CheckFailure) {
        self.failures.push(failure);
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Version bookkeeping derived from the production manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestData {
    pub major_version: u32,
    pub minor_version: u32,
    pub sessions_filename: String,
    /// Every file of the new manifest, the new sessions file last.
    pub data_files: Vec<String>,
    /// Every file of the manifest being replaced.
    pub previous_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format: String,
    pub data_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub hash: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub sessions_filename: String,
    pub timestamp: DateTime<Utc>,
    pub forced: bool,
    pub counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub data: ScheduleData,
    pub hash: String,
    pub up_to_date: bool,
    pub manifest: ManifestData,
    pub check: CheckResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Output identical to the last published run.
    UpToDate { hash: String },
    /// Written to stdout only.
    Shown { failures: usize },
    Published {
        sessions_filename: String,
        failures: usize,
    },
}
