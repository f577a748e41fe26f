use crate::config::toml_config::ScheduleSettings;
use crate::core::converters;
use crate::domain::model::Tag;
use serde_json::Value;

/// Looks up `name` in a vendor `Info` list of `{"Name", "Value"}` entries.
pub fn get_map_value<'a>(info: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    let Some(Value::Array(entries)) = info else {
        return None;
    };
    entries.iter().find_map(|entry| {
        let obj = entry.as_object()?;
        let entry_name = obj.get("Name")?.as_str()?;
        if entry_name == name {
            obj.get("Value").filter(|v| !v.is_object() && !v.is_array())
        } else {
            None
        }
    })
}

pub fn info_string(info: Option<&Value>, name: &str) -> Option<String> {
    match get_map_value(info, name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn info_flag(info: Option<&Value>, name: &str) -> bool {
    get_map_value(info, name)
        .and_then(converters::boolean)
        .unwrap_or(false)
}

/// Tags of the configured hashtag categories double as hashtags and video topics.
pub fn is_hashtag(tag: &Tag, settings: &ScheduleSettings) -> bool {
    settings.is_hashtag_category(&tag.category)
}
