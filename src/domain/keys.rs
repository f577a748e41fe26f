//! JSON key names of the vendor exports and of the published schedule document.

/// Source names, as they appear under `[sources]` in the configuration.
pub mod sources {
    pub const ROOMS: &str = "rooms";
    pub const CATEGORIES: &str = "categories";
    pub const SPEAKERS: &str = "speakers";
    pub const TOPICS: &str = "topics";
    pub const TAG_CATEGORY_MAPPING: &str = "tag_category_mapping";
    pub const TAG_CONF: &str = "tag_conf";

    pub const VENDOR: [&str; 4] = [ROOMS, CATEGORIES, SPEAKERS, TOPICS];
    pub const EXTRA: [&str; 2] = [TAG_CATEGORY_MAPPING, TAG_CONF];

    /// Key holding the element id for the given source.
    pub fn id_key(source_name: &str) -> &'static str {
        match source_name {
            TAG_CATEGORY_MAPPING => "category_id",
            TAG_CONF => "tag",
            _ => "Id",
        }
    }
}

/// Names used inside vendor `Info` lists.
pub mod info {
    pub const HIDDEN_SESSION: &str = "Hidden from schedule";
    pub const FEATURED_SESSION: &str = "Featured Session";
    pub const IS_LIVE_STREAM: &str = "Is Livestream";
    pub const VIDEO_URL: &str = "Video URL";
    pub const STREAM_VIDEO_ID: &str = "Stream Video ID";
    pub const PUBLIC_PLUS_ID: &str = "Public Google+ ID";
    pub const PUBLIC_TWITTER: &str = "Public Twitter";
}

pub const RELATED_NAME_SESSIONS: &str = "Related Sessions";

/// Top-level collections of the published document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MainType {
    Rooms,
    Blocks,
    Tags,
    Speakers,
    Sessions,
    VideoLibrary,
}

impl MainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainType::Rooms => "rooms",
            MainType::Blocks => "blocks",
            MainType::Tags => "tags",
            MainType::Speakers => "speakers",
            MainType::Sessions => "sessions",
            MainType::VideoLibrary => "video_library",
        }
    }
}

impl std::fmt::Display for MainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod rooms {
    pub const ID: &str = "id";
}

pub mod tags {
    pub const TAG: &str = "tag";
    pub const ORIGINAL_ID: &str = "original_id";
}

pub mod blocks {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const TYPE: &str = "type";
    pub const FREE: &str = "free";
}

pub mod sessions {
    pub const ID: &str = "id";
    pub const START: &str = "startTimestamp";
    pub const END: &str = "endTimestamp";
    pub const KEYNOTE_ID: &str = "__keynote__";
    pub const AFTER_HOURS_ID: &str = "__afterhours__";
}

pub mod video_library {
    pub const ID: &str = "id";
    pub const VID: &str = "vid";
}
