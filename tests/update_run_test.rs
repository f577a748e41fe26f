use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use schedule_updater::{
    EtlEngine, EtlError, LocalStorage, SchedulePipeline, UpdateOutcome, UpdaterConfig,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONFIG: &str = r#"
[updater]
input_path = "unused"
output_path = "unused"

[sources]
rooms = "vendor/rooms.json"
categories = "vendor/categories.json"
speakers = "vendor/speakers.json"
topics = "vendor/topics.json"
tag_category_mapping = "extra/tag_category_mapping.json"
tag_conf = "extra/tag_conf.json"

[conference]
year = 2016
utc_offset_minutes = -420
days = [
    { start = "2016-05-18T07:00:00-07:00", end = "2016-05-18T22:00:00-07:00" },
    { start = "2016-05-19T07:00:00-07:00", end = "2016-05-19T22:00:00-07:00" },
]

[video]
category_id = "video"

[urls]
session = "https://events.example.com/schedule?sid={id}"
session_photo = "https://storage.example.com/sessions/{id}.jpg"
speaker_photo = "https://storage.example.com/speakers/{id}.jpg"

[[rooms]]
id = "stage-1"
original_ids = ["vendor-room-1"]
title = "Stage 1"
"#;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

struct Workspace {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("data");
        copy_dir(&fixtures().join("input"), &input);
        copy_dir(&fixtures().join("output"), &output);
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    fn engine(
        &self,
        config: UpdaterConfig,
    ) -> EtlEngine<SchedulePipeline<LocalStorage, UpdaterConfig>> {
        let pipeline = SchedulePipeline::new(
            LocalStorage::new(&self.input),
            LocalStorage::new(&self.output),
            config,
        )
        .with_now(Utc.with_ymd_and_hms(2016, 5, 1, 0, 0, 0).unwrap());
        EtlEngine::new(pipeline)
    }

    fn read_json(&self, name: &str) -> serde_json::Value {
        let content = std::fs::read_to_string(self.output.join(name)).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

fn config() -> UpdaterConfig {
    UpdaterConfig::from_toml_str(CONFIG).unwrap()
}

#[tokio::test]
async fn test_consecutive_runs_publish_once() {
    let workspace = Workspace::new();

    let first = workspace.engine(config()).run().await.unwrap();
    assert_eq!(
        first,
        UpdateOutcome::Published {
            sessions_filename: "session_data_v1.1.json".to_string(),
            failures: 0
        }
    );

    let sessions = workspace.read_json("session_data_v1.1.json");
    let session = &sessions["sessions"][0];
    assert_eq!(session["url"], "https://events.example.com/schedule?sid=t1");
    assert_eq!(session["mainTag"], "TRACK_ANDROID");
    assert_eq!(session["color"], "#AED581");
    assert_eq!(session["hashtag"], "android");
    assert_eq!(session["room"], "stage-1");
    assert_eq!(session["isFeatured"], true);
    assert_eq!(sessions["video_library"][0]["vid"], "recap00001");
    assert_eq!(
        sessions["speakers"][0]["twitterUrl"],
        "https://twitter.com/ada"
    );

    let second = workspace.engine(config()).run().await.unwrap();
    assert!(matches!(second, UpdateOutcome::UpToDate { .. }));
    assert!(!workspace.output.join("session_data_v1.2.json").exists());

    let manifest = workspace.read_json("manifest_v1.json");
    assert_eq!(manifest["data_files"][1], "session_data_v1.1.json");
}

#[tokio::test]
async fn test_inconsistent_data_is_not_published() {
    let workspace = Workspace::new();
    let topics_path = workspace.input.join("vendor/topics.json");
    let topics = std::fs::read_to_string(&topics_path).unwrap();
    // starts on a day outside the conference
    std::fs::write(
        &topics_path,
        topics.replace("2016-05-19T13:00:00", "2016-05-17T13:00:00")
            .replace("2016-05-19T14:00:00", "2016-05-17T14:00:00"),
    )
    .unwrap();

    let err = workspace.engine(config()).run().await.unwrap_err();
    assert!(matches!(err, EtlError::ValidationError { .. }));

    let csv = std::fs::read_to_string(workspace.output.join("data_check_report.csv")).unwrap();
    assert!(csv.starts_with("entity,entity_id,reason\n"));
    assert!(csv.contains("sessions,t2,"));
    assert!(!workspace.output.join("session_data_v1.1.json").exists());

    let mut forced = config();
    forced.updater.force = true;
    let outcome = workspace.engine(forced).run().await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Published {
            sessions_filename: "session_data_v1.1.json".to_string(),
            failures: 1
        }
    );
}

#[tokio::test]
async fn test_sources_fetched_over_http() {
    let workspace = Workspace::new();
    let server = MockServer::start();
    let topics = std::fs::read_to_string(workspace.input.join("vendor/topics.json")).unwrap();
    let topics_mock = server.mock(|when, then| {
        when.method(GET).path("/api/topics");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(topics);
    });
    std::fs::remove_file(workspace.input.join("vendor/topics.json")).unwrap();

    let mut config = config();
    config
        .sources
        .insert("topics".to_string(), server.url("/api/topics"));

    let outcome = workspace.engine(config).run().await.unwrap();

    topics_mock.assert();
    assert!(matches!(outcome, UpdateOutcome::Published { .. }));
    let sessions = workspace.read_json("session_data_v1.1.json");
    assert_eq!(sessions["sessions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_obfuscated_run_hides_names() {
    let workspace = Workspace::new();
    let mut config = config();
    config.updater.obfuscate = true;
    config.schedule.check.halt_on_failure = false;

    workspace.engine(config).run().await.unwrap();

    let sessions = workspace.read_json("session_data_v1.1.json");
    assert_ne!(sessions["sessions"][0]["title"], "What's new in Android");
    assert_ne!(sessions["speakers"][0]["name"], "Ada Lovelace");
    // video ids are withheld, which the data check reports
    assert!(sessions["video_library"][0].get("vid").is_none());
    assert!(workspace.output.join("data_check_report.txt").exists());
}
