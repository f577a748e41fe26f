//! Rules mapping the vendor CMS export onto the published schedule document.

use crate::config::toml_config::ScheduleSettings;
use crate::core::{converters, helpers};
use crate::domain::keys::{self, info};
use crate::domain::model::{
    JsonDataSources, RelatedContent, Room, ScheduleData, Session, Speaker, Tag, VideoLibraryEntry,
};
use crate::domain::vendor::{
    CategoryTagMapping, RelatedGroup, RelatedTopic, TagConf, VendorCategory, VendorRoom, VendorSpeaker,
    VendorTopic,
};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

const TRACK_PREFIX: &str = "TRACK_";

const TRACK_COLORS: [(&str, &str); 18] = [
    ("ANDROID", "#AED581"),
    ("MOBILEWEB", "#FFF176"),
    ("CLOUD", "#80CBC4"),
    ("DESIGN", "#F8BBD0"),
    ("FIREBASE", "#FFD54F"),
    ("GAMES", "#DCE775"),
    ("IOT", "#BCAAA4"),
    ("LOCATION&MAPS", "#EF9A9A"),
    ("PLAY", "#CE93D8"),
    ("SEARCH", "#90CAF9"),
    ("TV&LIVINGROOM", "#B3E5FC"),
    ("VR", "#FF8A65"),
    ("MISC", "#C5C9E9"),
    ("ADS", "#B0BEC5"),
    ("ANDROIDSTUDIO", "#C4E2A2"),
    ("AUTO", "#CFD8DC"),
    ("MONETIZATION", "#A4D7A5"),
    ("WEAR", "#FFCD7A"),
];

pub fn track_color(track: &str) -> Option<&'static str> {
    TRACK_COLORS
        .iter()
        .find(|(name, _)| *name == track)
        .map(|(_, color)| *color)
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub obfuscate: bool,
    /// Reference instant; livestream links are dropped once the conference is over.
    pub now: DateTime<Utc>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            obfuscate: false,
            now: Utc::now(),
        }
    }
}

/// Lookups built by the earlier passes and consumed by the later ones.
#[derive(Debug, Default)]
struct ExtractionState {
    category_to_tag: HashMap<String, Tag>,
    main_category: Option<String>,
    speakers_by_id: HashMap<String, Speaker>,
    used_tags: HashSet<String>,
    used_speakers: HashSet<String>,
}

pub struct DataExtractor<'a> {
    settings: &'a ScheduleSettings,
    options: ExtractOptions,
}

impl<'a> DataExtractor<'a> {
    pub fn new(settings: &'a ScheduleSettings, options: ExtractOptions) -> Self {
        Self { settings, options }
    }

    pub fn extract(&self, sources: &JsonDataSources) -> Result<ScheduleData> {
        let topics: Vec<VendorTopic> = match sources.get_source(keys::sources::TOPICS) {
            Some(source) => source.records()?,
            None => {
                tracing::warn!("No topics source; the schedule will have no sessions");
                Vec::new()
            }
        };

        let mut state = ExtractionState::default();
        let rooms = self.extract_rooms(sources)?;
        let mut speakers = self.extract_speakers(sources, &mut state)?;
        let mut tags = self.extract_tags(sources, &topics, &mut state)?;
        let video_library = self.extract_video_sessions(&topics, &mut state);
        let sessions = self.extract_sessions(&topics, &mut state)?;

        let tag_count = tags.len();
        let speaker_count = speakers.len();
        tags.retain(|tag| state.used_tags.contains(&tag.tag));
        speakers.retain(|speaker| state.used_speakers.contains(&speaker.id));
        tracing::debug!(
            "Pruned {} unused tags and {} unused speakers",
            tag_count - tags.len(),
            speaker_count - speakers.len()
        );

        tracing::info!(
            "Extracted {} rooms, {} tags, {} speakers, {} sessions, {} videos",
            rooms.len(),
            tags.len(),
            speakers.len(),
            sessions.len(),
            video_library.len()
        );

        Ok(ScheduleData {
            rooms,
            video_library,
            sessions,
            speakers,
            tags,
        })
    }

    fn extract_rooms(&self, sources: &JsonDataSources) -> Result<Vec<Room>> {
        let Some(source) = sources.get_source(keys::sources::ROOMS) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut rooms = Vec::new();
        for origin in source.records::<VendorRoom>()? {
            let Some(original_id) = origin.id else {
                tracing::debug!("Skipping room without id");
                continue;
            };
            let id = self.settings.room_id(&original_id);
            if !seen.insert(id.clone()) {
                continue;
            }
            let name = self
                .settings
                .room_title(&id, origin.name.as_deref().unwrap_or_default());
            rooms.push(Room {
                id,
                name,
                original_id,
            });
        }
        Ok(rooms)
    }

    fn extract_tags(
        &self,
        sources: &JsonDataSources,
        topics: &[VendorTopic],
        state: &mut ExtractionState,
    ) -> Result<Vec<Tag>> {
        let Some(source) = sources.get_source(keys::sources::CATEGORIES) else {
            return Ok(Vec::new());
        };
        let Some(mapping_source) = sources.get_source(keys::sources::TAG_CATEGORY_MAPPING) else {
            tracing::warn!("No tag_category_mapping source; categories cannot become tags");
            return Ok(Vec::new());
        };
        let tag_conf_source = sources.get_source(keys::sources::TAG_CONF);

        let mut original_tag_names = HashSet::new();
        let mut tags = Vec::new();

        for origin in source.records::<VendorCategory>()? {
            // categories without a parent are the roots, i.e. the tag categories themselves
            let Some(parent_id) = origin.parent_id.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            let Some(mapping) = mapping_source.record_by_id::<CategoryTagMapping>(parent_id)? else {
                continue;
            };
            let Some(category) = mapping.tag_name else {
                continue;
            };
            if mapping.is_default {
                state.main_category = Some(category.clone());
            }
            let (Some(original_id), Some(original_name)) = (origin.id, origin.name) else {
                tracing::debug!("Skipping category without id or name under {}", parent_id);
                continue;
            };

            let original_tag_name = format!("{}_{}", category, converters::tag_name(&original_name));
            let (name, tag_name) = if self.options.obfuscate {
                let name = converters::obfuscate(&original_name);
                let tag_name = format!("{}_{}", category, converters::tag_name(&name));
                (name, tag_name)
            } else {
                (original_name, original_tag_name.clone())
            };

            let mut tag = Tag {
                tag: tag_name,
                name,
                category,
                original_id: original_id.clone(),
                abstract_text: origin.description.map(|d| self.maybe_obfuscate(d)),
                order_in_category: None,
                color: None,
                hashtag: None,
                photo_url: None,
            };

            if let Some(conf_source) = tag_conf_source {
                if let Some(conf) = conf_source.record_by_id::<TagConf>(&original_tag_name)? {
                    tag.order_in_category = conf.order_in_category;
                    tag.color = conf.color;
                    tag.hashtag = conf.hashtag;
                }
            }

            if let Some(track) = tag.tag.strip_prefix(TRACK_PREFIX) {
                tag.photo_url = track_photo_object_id(topics, &original_id).map(|object_id| {
                    converters::url_from_template(&self.settings.urls.session_photo, &object_id)
                });
                if let Some(color) = track_color(track) {
                    tag.color = Some(color.to_string());
                }
            }

            state.category_to_tag.insert(original_id, tag.clone());
            if original_tag_names.insert(original_tag_name) {
                tags.push(tag);
            }
        }

        Ok(tags)
    }

    fn extract_speakers(
        &self,
        sources: &JsonDataSources,
        state: &mut ExtractionState,
    ) -> Result<Vec<Speaker>> {
        let Some(source) = sources.get_source(keys::sources::SPEAKERS) else {
            return Ok(Vec::new());
        };

        let urls = &self.settings.urls;
        let mut speakers = Vec::new();
        for origin in source.records::<VendorSpeaker>()? {
            let Some(id) = origin.id else {
                tracing::debug!("Skipping speaker without id");
                continue;
            };
            let info = origin.info.as_ref();
            let has_photo = origin.photo.as_deref().is_some_and(|p| !p.is_empty());

            let speaker = Speaker {
                // photos are resized offline and stored under the speaker id
                thumbnail_url: has_photo
                    .then(|| converters::url_from_template(&urls.speaker_photo, &id)),
                plusone_url: helpers::info_string(info, info::PUBLIC_PLUS_ID)
                    .and_then(|v| converters::profile_url(&urls.plus_profile, &v)),
                twitter_url: helpers::info_string(info, info::PUBLIC_TWITTER)
                    .and_then(|v| converters::profile_url(&urls.twitter_profile, &v)),
                name: origin.name.map(|v| self.maybe_obfuscate(v)),
                bio: origin.bio.map(|v| self.maybe_obfuscate(v)),
                company: origin.company_name.map(|v| self.maybe_obfuscate(v)),
                id,
            };
            state.speakers_by_id.insert(speaker.id.clone(), speaker.clone());
            speakers.push(speaker);
        }
        Ok(speakers)
    }

    fn extract_video_sessions(
        &self,
        topics: &[VendorTopic],
        state: &mut ExtractionState,
    ) -> Vec<VideoLibraryEntry> {
        let mut videos = Vec::new();
        for origin in topics {
            if !self.is_video_session(origin) || is_hidden_session(origin) {
                continue;
            }

            let vid = self
                .video_from_topic_info(origin, info::VIDEO_URL, None)
                .and_then(|v| converters::youtube_id(&v));

            let topic = origin
                .category_ids
                .iter()
                .filter_map(|category| state.category_to_tag.get(category))
                .find(|tag| helpers::is_hashtag(tag, self.settings))
                .map(|tag| tag.name.clone());

            let mut speaker_names = Vec::new();
            for speaker_id in &origin.speaker_ids {
                state.used_speakers.insert(speaker_id.clone());
                if let Some(name) = state
                    .speakers_by_id
                    .get(speaker_id)
                    .and_then(|s| s.name.clone())
                {
                    speaker_names.push(name);
                }
            }

            videos.push(VideoLibraryEntry {
                id: vid.clone(),
                thumbnail_url: vid
                    .as_ref()
                    .map(|v| format!("http://img.youtube.com/vi/{}/hqdefault.jpg", v)),
                vid,
                title: origin.title.clone().map(|v| self.maybe_obfuscate(v)),
                desc: origin.description.clone().map(|v| self.maybe_obfuscate(v)),
                year: self.settings.conference.year,
                topic,
                speakers: speaker_names.join(", "),
            });
        }
        videos
    }

    fn extract_sessions(
        &self,
        topics: &[VendorTopic],
        state: &mut ExtractionState,
    ) -> Result<Vec<Session>> {
        let offset = self.venue_offset()?;
        let urls = &self.settings.urls;
        let mut sessions = Vec::new();

        for origin in topics {
            if self.is_video_session(origin) || is_hidden_session(origin) {
                continue;
            }
            let title = origin.title.as_deref().map(str::trim);
            // the CMS carries an empty placeholder for the keynote
            if title.is_some_and(|t| t.eq_ignore_ascii_case("keynote")) {
                continue;
            }
            let Some(topic_id) = origin.id.clone() else {
                tracing::debug!("Skipping topic without id: {:?}", origin.title);
                continue;
            };
            let id = if title.is_some_and(|t| t.eq_ignore_ascii_case("after hours")) {
                keys::sessions::AFTER_HOURS_ID.to_string()
            } else {
                topic_id.clone()
            };

            let is_livestream = self.is_livestreamed(origin);
            let youtube_url = if is_livestream {
                self.video_from_topic_info(
                    origin,
                    info::STREAM_VIDEO_ID,
                    self.settings.video.livestream_url_for_empty.as_deref(),
                )
            } else {
                helpers::info_string(origin.info.as_ref(), info::VIDEO_URL)
                    .and_then(|v| converters::youtube_id(&v))
            }
            .filter(|v| !v.is_empty());

            let mut session = Session {
                url: converters::url_from_template(&urls.session, &topic_id),
                title: origin.title.clone().map(|v| self.maybe_obfuscate(v)),
                description: origin.description.clone().map(|v| self.maybe_obfuscate(v)),
                start_timestamp: origin.start.as_deref().map(|v| convert_timestamp(&id, v, offset)),
                end_timestamp: origin.finish.as_deref().map(|v| convert_timestamp(&id, v, offset)),
                is_featured: helpers::info_flag(origin.info.as_ref(), info::FEATURED_SESSION),
                is_livestream,
                // photos are resized offline and stored under the topic id
                photo_url: origin
                    .has_documents()
                    .then(|| converters::url_from_template(&urls.session_photo, &topic_id)),
                youtube_url,
                captions_url: None,
                related_content: related_content(origin),
                tags: Vec::new(),
                main_tag: None,
                color: None,
                hashtag: None,
                speakers: origin.speaker_ids.clone(),
                room: None,
                id,
            };

            for category in &origin.category_ids {
                let Some(tag) = state.category_to_tag.get(category) else {
                    continue;
                };
                session.tags.push(tag.tag.clone());
                state.used_tags.insert(tag.tag.clone());

                // tags after the main one no longer supply a hashtag
                if session.main_tag.is_some() {
                    continue;
                }
                if state.main_category.as_ref() == Some(&tag.category) {
                    session.main_tag = Some(tag.tag.clone());
                    session.color = tag.color.clone();
                }
                if session.hashtag.is_none() && helpers::is_hashtag(tag, self.settings) {
                    session.hashtag = tag
                        .hashtag
                        .clone()
                        .filter(|h| !h.is_empty())
                        .or_else(|| Some(converters::tag_name(&tag.name).to_lowercase()));
                }
            }

            state
                .used_speakers
                .extend(origin.speaker_ids.iter().cloned());

            if let Some(room_id) = origin
                .sessions
                .as_ref()
                .and_then(|s| s.first())
                .and_then(|s| s.room_id.as_deref())
            {
                let room_id = self.settings.room_id(room_id);
                session.captions_url = self.settings.room_captions(&room_id).map(str::to_string);
                session.room = Some(room_id);
            }

            sessions.push(session);
        }
        Ok(sessions)
    }

    fn venue_offset(&self) -> Result<FixedOffset> {
        self.settings
            .conference
            .offset()
            .ok_or_else(|| EtlError::InvalidConfigValueError {
                field: "conference.utc_offset_minutes".to_string(),
                value: self.settings.conference.utc_offset_minutes.to_string(),
                reason: "Not a valid UTC offset".to_string(),
            })
    }

    fn maybe_obfuscate(&self, text: String) -> String {
        if self.options.obfuscate {
            converters::obfuscate(&text)
        } else {
            text
        }
    }

    fn is_video_session(&self, topic: &VendorTopic) -> bool {
        topic.has_category(&self.settings.video.category_id)
    }

    fn is_livestreamed(&self, topic: &VendorTopic) -> bool {
        // data generated after the conference never carries livestream links
        if self
            .settings
            .conference
            .end()
            .is_some_and(|end| self.options.now > end)
        {
            return false;
        }
        helpers::info_string(topic.info.as_ref(), info::IS_LIVE_STREAM)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Video links are withheld from obfuscated output; `fallback` still applies.
    fn video_from_topic_info(
        &self,
        topic: &VendorTopic,
        info_name: &str,
        fallback: Option<&str>,
    ) -> Option<String> {
        let value = if self.options.obfuscate {
            None
        } else {
            helpers::info_string(topic.info.as_ref(), info_name).filter(|v| !v.trim().is_empty())
        };
        value.or_else(|| fallback.map(str::to_string))
    }
}

fn is_hidden_session(topic: &VendorTopic) -> bool {
    helpers::info_flag(topic.info.as_ref(), info::HIDDEN_SESSION)
}

fn convert_timestamp(session_id: &str, raw: &str, offset: FixedOffset) -> String {
    converters::datetime(raw, offset).unwrap_or_else(|| {
        tracing::warn!("Session {}: unrecognized timestamp '{}'", session_id, raw);
        raw.to_string()
    })
}

/// Object id of the first document of the first topic filed under `track_id`.
fn track_photo_object_id(topics: &[VendorTopic], track_id: &str) -> Option<String> {
    topics
        .iter()
        .filter(|topic| topic.has_category(track_id))
        .find_map(|topic| topic.documents.as_ref()?.first())
        .and_then(|doc| doc.object_id.clone())
}

fn related_content(topic: &VendorTopic) -> Option<Vec<RelatedContent>> {
    let mut result = None;
    for group in topic.related.as_deref().unwrap_or_default() {
        let Ok(group) = serde_json::from_value::<RelatedGroup>(group.clone()) else {
            continue;
        };
        if group.values.is_none() || group.name.as_deref() != Some(keys::RELATED_NAME_SESSIONS) {
            continue;
        }
        let Some(Value::Array(related_topics)) = group.topics else {
            continue;
        };

        let items = related_topics
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|t| serde_json::from_value::<RelatedTopic>(t).ok())
            .filter_map(|t| {
                Some(RelatedContent {
                    id: t.id?,
                    title: t.title?,
                })
            })
            .collect();
        result = Some(items);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::tests::sample_config;
    use crate::domain::model::JsonDataSource;
    use chrono::TimeZone;
    use serde_json::json;

    fn during_conference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 5, 18, 18, 0, 0).unwrap()
    }

    fn sources() -> JsonDataSources {
        let mut sources = JsonDataSources::new();
        let mut put = |name: &str, value: Value| {
            sources.put(JsonDataSource::from_value(name, value).unwrap());
        };
        put(
            "rooms",
            json!([
                {"Id": "vendor-room-1", "Name": "Amphitheatre"},
                {"Id": "vendor-room-1b", "Name": "Amphitheatre (overflow)"},
                {"Id": "r2", "Name": "Room 2"}
            ]),
        );
        put(
            "tag_category_mapping",
            json!([
                {"category_id": "p-topic", "tag_name": "TOPIC"},
                {"category_id": "p-track", "tag_name": "TRACK", "is_default": true},
                {"category_id": "p-type", "tag_name": "TYPE"}
            ]),
        );
        put(
            "tag_conf",
            json!([
                {"tag": "TOPIC_ANDROID", "order_in_category": 1, "color": "#000000", "hashtag": "android"},
                {"tag": "TRACK_ANDROID", "order_in_category": 2, "color": "#111111"}
            ]),
        );
        put(
            "categories",
            json!([
                {"Id": "p-topic", "Name": "Topic"},
                {"Id": "c-android", "Name": "Android", "ParentId": "p-topic", "Description": "All things Android"},
                {"Id": "c-cloud", "Name": "Cloud Platform", "ParentId": "p-topic"},
                {"Id": "c-track-android", "Name": "Android", "ParentId": "p-track"},
                {"Id": "c-session", "Name": "Session", "ParentId": "p-type"},
                {"Id": "c-orphan", "Name": "Orphan", "ParentId": "p-unknown"},
                {"Id": "c-android-dup", "Name": "Android", "ParentId": "p-topic"},
                {"Id": "c-unused", "Name": "Unused", "ParentId": "p-type"}
            ]),
        );
        put(
            "speakers",
            json!([
                {"Id": "sp1", "Name": "Ada", "Bio": "Engineer", "CompanyName": "Google", "Photo": "http://x/ada.png",
                 "Info": [{"Name": "Public Twitter", "Value": "@ada"}]},
                {"Id": "sp2", "Name": "Grace", "Photo": ""},
                {"Id": "sp3", "Name": "Nobody"}
            ]),
        );
        put(
            "topics",
            json!([
                {
                    "Id": "t1", "Title": "What's new in Android", "Description": "Talk",
                    "Start": "2016-05-18T10:00:00", "Finish": "2016-05-18T11:00:00",
                    "CategoryIds": ["c-android-dup", "c-track-android", "c-session"],
                    "SpeakerIds": ["sp1"],
                    "Documents": [{"ObjectId": "doc-t1"}],
                    "Sessions": [{"RoomId": "vendor-room-1b"}],
                    "Info": [
                        {"Name": "Featured Session", "Value": "true"},
                        {"Name": "Is Livestream", "Value": "true"},
                        {"Name": "Stream Video ID", "Value": "stream123"}
                    ],
                    "Related": [
                        {"name": "Related Sessions", "values": [], "topics": [
                            {"Id": "t2", "Title": "Cloud talk"},
                            {"Id": "t9"}
                        ]},
                        {"name": "Other", "values": []}
                    ]
                },
                {
                    "Id": "t2", "Title": "Cloud talk",
                    "Start": "2016-05-18T12:00:00", "Finish": "2016-05-18T13:00:00",
                    "CategoryIds": ["c-cloud"],
                    "SpeakerIds": ["sp2"],
                    "Sessions": [{"RoomId": "r2"}],
                    "Info": [{"Name": "Video URL", "Value": "https://www.youtube.com/watch?v=cloudvid01"}]
                },
                {"Id": "t3", "Title": "Keynote", "CategoryIds": []},
                {"Id": "t4", "Title": "After Hours", "CategoryIds": [], "Start": "2016-05-18T19:00:00", "Finish": "2016-05-18T22:00:00"},
                {"Id": "t5", "Title": "Secret", "CategoryIds": ["c-android"],
                 "Info": [{"Name": "Hidden from schedule", "Value": true}]},
                {"Id": "t6", "Title": "Recorded Android talk", "Description": "Video",
                 "CategoryIds": ["video", "c-android"], "SpeakerIds": ["sp1", "sp2", "sp-unknown"],
                 "Info": [{"Name": "Video URL", "Value": "https://youtu.be/vid0000001"}]},
                {"Id": "t7", "Title": "Hidden video", "CategoryIds": ["video"], "SpeakerIds": ["sp3"],
                 "Info": [{"Name": "Hidden from schedule", "Value": "true"}]}
            ]),
        );
        sources
    }

    fn extract_with(options: ExtractOptions) -> ScheduleData {
        let config = sample_config();
        DataExtractor::new(&config.schedule, options)
            .extract(&sources())
            .unwrap()
    }

    fn extract() -> ScheduleData {
        extract_with(ExtractOptions {
            obfuscate: false,
            now: during_conference(),
        })
    }

    #[test]
    fn test_rooms_are_mapped_and_deduplicated() {
        let data = extract();
        assert_eq!(data.rooms.len(), 2);
        assert_eq!(
            data.rooms[0],
            Room {
                id: "stage-1".to_string(),
                name: "Stage 1".to_string(),
                original_id: "vendor-room-1".to_string(),
            }
        );
        assert_eq!(data.rooms[1].name, "Room 2");
    }

    #[test]
    fn test_tags_follow_category_mapping_and_are_pruned() {
        let data = extract();
        let names: Vec<&str> = data.tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(
            names,
            vec!["TOPIC_ANDROID", "TOPIC_CLOUDPLATFORM", "TRACK_ANDROID", "TYPE_SESSION"]
        );

        let android = &data.tags[0];
        assert_eq!(android.original_id, "c-android");
        assert_eq!(android.abstract_text.as_deref(), Some("All things Android"));
        assert_eq!(android.order_in_category, Some(1));
        assert_eq!(android.hashtag.as_deref(), Some("android"));
    }

    #[test]
    fn test_track_tags_get_photo_and_fixed_color() {
        let data = extract();
        let track = data.tags.iter().find(|t| t.tag == "TRACK_ANDROID").unwrap();
        assert_eq!(track.color.as_deref(), Some("#AED581"));
        assert_eq!(track.order_in_category, Some(2));
        assert_eq!(
            track.photo_url.as_deref(),
            Some("https://storage.example.com/images/sessions/doc-t1.jpg")
        );
        assert_eq!(track_color("UNKNOWN"), None);
    }

    #[test]
    fn test_sessions_skip_video_hidden_and_keynote() {
        let data = extract();
        let ids: Vec<&str> = data.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "__afterhours__"]);
        assert_eq!(
            data.sessions[2].url,
            "https://events.example.com/io2016/schedule?sid=t4"
        );
    }

    #[test]
    fn test_session_fields() {
        let data = extract();
        let session = &data.sessions[0];

        assert_eq!(session.start_timestamp.as_deref(), Some("2016-05-18T17:00:00Z"));
        assert_eq!(session.end_timestamp.as_deref(), Some("2016-05-18T18:00:00Z"));
        assert!(session.is_featured);
        assert!(session.is_livestream);
        assert_eq!(session.youtube_url.as_deref(), Some("stream123"));
        assert_eq!(
            session.photo_url.as_deref(),
            Some("https://storage.example.com/images/sessions/t1.jpg")
        );
        assert_eq!(
            session.tags,
            vec!["TOPIC_ANDROID", "TRACK_ANDROID", "TYPE_SESSION"]
        );
        assert_eq!(session.main_tag.as_deref(), Some("TRACK_ANDROID"));
        assert_eq!(session.color.as_deref(), Some("#AED581"));
        assert_eq!(session.hashtag.as_deref(), Some("android"));
        assert_eq!(session.room.as_deref(), Some("stage-1"));
        assert_eq!(
            session.captions_url.as_deref(),
            Some("https://captions.example.com/stage1")
        );
        assert_eq!(
            session.related_content,
            Some(vec![RelatedContent {
                id: "t2".to_string(),
                title: "Cloud talk".to_string()
            }])
        );
    }

    #[test]
    fn test_no_hashtag_after_main_tag() {
        let mut sources = sources();
        sources.put(
            JsonDataSource::from_value(
                "topics",
                json!([{
                    "Id": "t8", "Title": "Android track talk",
                    "Start": "2016-05-18T10:00:00", "Finish": "2016-05-18T11:00:00",
                    "CategoryIds": ["c-track-android", "c-android"]
                }]),
            )
            .unwrap(),
        );
        let config = sample_config();
        let data = DataExtractor::new(
            &config.schedule,
            ExtractOptions {
                obfuscate: false,
                now: during_conference(),
            },
        )
        .extract(&sources)
        .unwrap();

        let session = &data.sessions[0];
        assert_eq!(session.tags, vec!["TRACK_ANDROID", "TOPIC_ANDROID"]);
        assert_eq!(session.main_tag.as_deref(), Some("TRACK_ANDROID"));
        assert!(session.hashtag.is_none());
    }

    #[test]
    fn test_non_livestream_session_uses_video_id() {
        let data = extract();
        let session = &data.sessions[1];
        assert!(!session.is_livestream);
        assert_eq!(session.youtube_url.as_deref(), Some("cloudvid01"));
        assert_eq!(session.hashtag.as_deref(), Some("cloudplatform"));
        assert!(session.main_tag.is_none());
        assert!(session.related_content.is_none());
        assert!(session.captions_url.is_none());
    }

    #[test]
    fn test_livestream_dropped_after_conference() {
        let data = extract_with(ExtractOptions {
            obfuscate: false,
            now: Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap(),
        });
        assert!(!data.sessions[0].is_livestream);
        assert!(data.sessions[0].youtube_url.is_none());
    }

    #[test]
    fn test_video_library_entries() {
        let data = extract();
        assert_eq!(data.video_library.len(), 1);
        let video = &data.video_library[0];
        assert_eq!(video.id.as_deref(), Some("vid0000001"));
        assert_eq!(video.vid.as_deref(), Some("vid0000001"));
        assert_eq!(
            video.thumbnail_url.as_deref(),
            Some("http://img.youtube.com/vi/vid0000001/hqdefault.jpg")
        );
        assert_eq!(video.year, 2016);
        assert_eq!(video.topic.as_deref(), Some("Android"));
        assert_eq!(video.speakers, "Ada, Grace");
    }

    #[test]
    fn test_speakers_are_pruned_and_linked() {
        let data = extract();
        let ids: Vec<&str> = data.speakers.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sp1", "sp2"]);

        let ada = &data.speakers[0];
        assert_eq!(
            ada.thumbnail_url.as_deref(),
            Some("https://storage.example.com/images/speakers/sp1.jpg")
        );
        assert_eq!(ada.twitter_url.as_deref(), Some("https://twitter.com/ada"));
        assert_eq!(ada.company.as_deref(), Some("Google"));
        assert!(data.speakers[1].thumbnail_url.is_none());
    }

    #[test]
    fn test_obfuscation_hides_text_and_videos() {
        let data = extract_with(ExtractOptions {
            obfuscate: true,
            now: during_conference(),
        });

        assert_ne!(data.sessions[0].title.as_deref(), Some("What's new in Android"));
        assert_ne!(data.speakers[0].name.as_deref(), Some("Ada"));
        // tag_conf is still matched on the real tag name
        let topic = data.tags.iter().find(|t| t.original_id == "c-android").unwrap();
        assert_ne!(topic.tag, "TOPIC_ANDROID");
        assert_eq!(topic.order_in_category, Some(1));
        // livestreams fall back to the placeholder stream
        assert_eq!(
            data.sessions[0].youtube_url.as_deref(),
            Some("https://www.youtube.com/embed/live")
        );
        assert!(data.video_library[0].vid.is_none());
    }

    #[test]
    fn test_missing_sources_yield_empty_document() {
        let config = sample_config();
        let data = DataExtractor::new(&config.schedule, ExtractOptions::default())
            .extract(&JsonDataSources::new())
            .unwrap();
        assert_eq!(data, ScheduleData::default());
    }
}
