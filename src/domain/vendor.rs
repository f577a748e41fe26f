//! Typed views of the vendor CMS export and the auxiliary mapping files.
//!
//! Every field is optional: exports are hand edited and routinely incomplete.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(crate::domain::model::id_as_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// Keeps the well-formed elements of an array; anything else counts as absent.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorRoom {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorCategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorSpeaker {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub photo: Option<String>,
    #[serde(default)]
    pub info: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    #[serde(default, deserialize_with = "lenient_string")]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicSession {
    #[serde(default, deserialize_with = "lenient_string")]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelatedTopic {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
}

/// Group of related content; only the `topics` list of the sessions group is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedGroup {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub values: Option<Value>,
    #[serde(default)]
    pub topics: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorTopic {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub finish: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub documents: Option<Vec<Document>>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub category_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub speaker_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub sessions: Option<Vec<TopicSession>>,
    #[serde(default)]
    pub info: Option<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub related: Option<Vec<Value>>,
}

impl VendorTopic {
    pub fn has_category(&self, category_id: &str) -> bool {
        self.category_ids.iter().any(|c| c == category_id)
    }

    pub fn has_documents(&self) -> bool {
        self.documents.as_ref().is_some_and(|docs| !docs.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryTagMapping {
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tag_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagConf {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub order_in_category: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hashtag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_tolerates_numeric_ids_and_missing_fields() {
        let topic: VendorTopic = serde_json::from_value(json!({
            "Id": 42,
            "Title": "Intro",
            "CategoryIds": ["c1", 7],
            "Documents": [{"ObjectId": "doc1"}]
        }))
        .unwrap();

        assert_eq!(topic.id.as_deref(), Some("42"));
        assert_eq!(topic.category_ids, vec!["c1", "7"]);
        assert!(topic.has_category("7"));
        assert!(topic.has_documents());
        assert!(topic.speaker_ids.is_empty());
        assert!(topic.sessions.is_none());
    }

    #[test]
    fn test_topic_keeps_well_formed_nested_entries() {
        let topic: VendorTopic = serde_json::from_value(json!({
            "Id": "t2",
            "Documents": ["photo.jpg", {"ObjectId": "doc2"}],
            "Sessions": [42, {"RoomId": "r1"}],
            "Related": {"name": "Related Sessions"}
        }))
        .unwrap();

        let documents = topic.documents.as_deref().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].object_id.as_deref(), Some("doc2"));
        assert_eq!(topic.sessions.as_deref().unwrap()[0].room_id.as_deref(), Some("r1"));
        assert!(topic.related.is_none());

        let topic: VendorTopic =
            serde_json::from_value(json!({"Id": "t3", "Documents": ["photo.jpg"]})).unwrap();
        assert!(!topic.has_documents());
    }

    #[test]
    fn test_mapping_flags_accept_strings() {
        let mapping: CategoryTagMapping = serde_json::from_value(json!({
            "category_id": "p1", "tag_name": "TOPIC", "is_default": "TRUE"
        }))
        .unwrap();
        assert!(mapping.is_default);

        let conf: TagConf =
            serde_json::from_value(json!({"tag": "TOPIC_X", "order_in_category": "3"})).unwrap();
        assert_eq!(conf.order_in_category, Some(3));
    }
}
