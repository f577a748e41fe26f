//! Value conversions applied while mapping vendor fields to the published schema.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const VENDOR_LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

const LOREM: &[u8] = b"loremipsumdolorsitametconsecteturadipiscingelitseddoeiusmodtempor";

static YOUTUBE_ID_IN_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|[?&]v=|/embed/|/v/)([A-Za-z0-9_-]{6,})").ok()
});

static BARE_YOUTUBE_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").ok());

/// "Location & Maps" becomes "LOCATION&MAPS".
pub fn tag_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Replaces letters and digits with placeholder text of the same shape.
pub fn obfuscate(text: &str) -> String {
    let mut position = 0usize;
    text.chars()
        .map(|c| {
            if c.is_alphabetic() {
                let replacement = LOREM[position % LOREM.len()] as char;
                position += 1;
                if c.is_uppercase() {
                    replacement.to_ascii_uppercase()
                } else {
                    replacement
                }
            } else if c.is_ascii_digit() {
                position += 1;
                char::from(b'0' + (position % 10) as u8)
            } else {
                c
            }
        })
        .collect()
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Vendor timestamps are venue-local unless they carry an offset; output is UTC.
pub fn datetime(value: &str, venue_offset: FixedOffset) -> Option<String> {
    let value = value.trim();
    if let Some(utc) = parse_timestamp(value) {
        return Some(utc.format(OUTPUT_DATETIME_FORMAT).to_string());
    }

    VENDOR_LOCAL_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(value, format).ok()?;
        let local = venue_offset.from_local_datetime(&naive).single()?;
        Some(
            local
                .with_timezone(&Utc)
                .format(OUTPUT_DATETIME_FORMAT)
                .to_string(),
        )
    })
}

pub fn url_from_template(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}

/// Extracts the video id from a YouTube URL, or accepts a bare id.
pub fn youtube_id(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(caps) = YOUTUBE_ID_IN_URL.as_ref()?.captures(value) {
        return Some(caps[1].to_string());
    }
    if BARE_YOUTUBE_ID.as_ref()?.is_match(value) {
        return Some(value.to_string());
    }
    None
}

pub fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Profile URL from a handle or id; values that already are URLs pass through.
pub fn profile_url(template: &str, value: &str) -> Option<String> {
    let value = value.trim().trim_start_matches('@');
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    Some(url_from_template(template, value))
}
