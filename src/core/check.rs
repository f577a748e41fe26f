//! Sanity checks run on a freshly generated dataset before it is published.

use crate::config::toml_config::ScheduleSettings;
use crate::core::converters;
use crate::domain::keys::{self, MainType};
use crate::domain::model::{id_as_string, CheckFailure, CheckResult, DataSet};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Block {
    interval: Interval,
    block_type: Option<String>,
}

pub struct DataCheck<'a> {
    settings: &'a ScheduleSettings,
}

impl<'a> DataCheck<'a> {
    pub fn new(settings: &'a ScheduleSettings) -> Self {
        Self { settings }
    }

    /// Compares `new` against the currently published `old` data.
    ///
    /// Fails only when the new data has no `blocks` collection at all; every
    /// other problem is collected as a [`CheckFailure`].
    pub fn check(&self, old: &DataSet, new: &DataSet) -> Result<CheckResult> {
        let mut result = CheckResult::default();

        self.check_array_sizes(&mut result, old, new);
        check_entities_kept(&mut result, old, new, MainType::Tags, keys::tags::TAG, |tag| {
            let original_id = tag
                .get(keys::tags::ORIGINAL_ID)
                .and_then(id_as_string)
                .unwrap_or_default();
            format!(
                "Tag could not be found or changed name. Original category ID = {}",
                original_id
            )
        });
        check_entities_kept(&mut result, old, new, MainType::Rooms, keys::rooms::ID, |room| {
            format!("Room could not be found. Original room: {}", room)
        });

        let blocks = self.check_blocks(&mut result, new)?;
        self.check_sessions(&mut result, new, &blocks);
        check_video_library(&mut result, new);

        if result.is_ok() {
            tracing::info!("Data check passed");
        } else {
            tracing::warn!("Data check found {} failures", result.failures.len());
        }
        Ok(result)
    }

    fn check_array_sizes(&self, result: &mut CheckResult, old: &DataSet, new: &DataSet) {
        let min_percent = self.settings.check.min_size_percent;
        for (entity, old_items) in old.iter() {
            let Some(new_items) = new.get(entity) else {
                result.push(CheckFailure::new(
                    entity.as_str(),
                    None,
                    "Could not find entity in new data",
                ));
                continue;
            };
            if new_items.len() * 100 < old_items.len() * min_percent {
                result.push(CheckFailure::new(
                    entity.as_str(),
                    None,
                    format!(
                        "{}% or less entities of this type compared to previous ({} now, {} before)",
                        min_percent,
                        new_items.len(),
                        old_items.len()
                    ),
                ));
            }
        }
    }

    fn conference_bounds(&self) -> Option<Interval> {
        let conference = &self.settings.conference;
        Some(Interval {
            start: conference.start()?,
            end: conference.end()?,
        })
    }

    fn within_conference(&self, interval: &Interval) -> bool {
        self.conference_bounds()
            .map_or(true, |c| interval.start >= c.start && interval.end <= c.end)
    }

    fn check_blocks(&self, result: &mut CheckResult, new: &DataSet) -> Result<Vec<Block>> {
        let Some(items) = new.get(MainType::Blocks.as_str()) else {
            let present: Vec<&str> = new.keys().collect();
            return Err(EtlError::ValidationError {
                message: format!(
                    "Could not find the blocks entities. Entities in new data are: {}",
                    present.join(", ")
                ),
            });
        };

        let mut blocks = Vec::with_capacity(items.len());
        for block in items {
            let Some(interval) = parse_interval(block, keys::blocks::START, keys::blocks::END)
            else {
                result.push(CheckFailure::new(
                    MainType::Blocks.as_str(),
                    None,
                    format!("Could not parse block start or end date. Block={}", block),
                ));
                continue;
            };

            if interval.start >= interval.end || !self.within_conference(&interval) {
                result.push(CheckFailure::new(
                    MainType::Blocks.as_str(),
                    None,
                    format!("Invalid block start or end date. Block={}", block),
                ));
            }
            blocks.push(Block {
                interval,
                block_type: block
                    .get(keys::blocks::TYPE)
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
        Ok(blocks)
    }

    fn check_sessions(&self, result: &mut CheckResult, new: &DataSet, blocks: &[Block]) {
        let max_duration = Duration::hours(self.settings.check.max_session_hours);
        let entity = MainType::Sessions.as_str();

        for session in new.get(entity).map(Vec::as_slice).unwrap_or_default() {
            let id = session.get(keys::sessions::ID).and_then(id_as_string);
            let fail = |reason: &str| {
                CheckFailure::new(entity, id.clone(), format!("{}. Session={}", reason, session))
            };

            let Some(interval) =
                parse_interval(session, keys::sessions::START, keys::sessions::END)
            else {
                result.push(fail("Could not parse session start or end date"));
                continue;
            };

            if interval.start >= interval.end {
                result.push(fail("Session ends before or at the same time as it starts"));
            } else if interval.end - interval.start > max_duration {
                result.push(fail(&format!(
                    "Session is longer than {} hours",
                    self.settings.check.max_session_hours
                )));
            } else if !self.within_conference(&interval) {
                result.push(fail(
                    "Session starts before or ends after the days of the conference",
                ));
            } else if id.as_deref() != Some(keys::sessions::KEYNOTE_ID)
                && !starts_in_free_block(&interval, blocks)
            {
                result.push(fail(
                    "There is no FREE block where this session start date lies on",
                ));
            }
        }
    }
}

fn parse_interval(entity: &Value, start_key: &str, end_key: &str) -> Option<Interval> {
    let parse = |key: &str| {
        entity
            .get(key)
            .and_then(Value::as_str)
            .and_then(converters::parse_timestamp)
    };
    Some(Interval {
        start: parse(start_key)?,
        end: parse(end_key)?,
    })
}

fn starts_in_free_block(session: &Interval, blocks: &[Block]) -> bool {
    blocks.iter().any(|block| {
        block.block_type.as_deref() == Some(keys::blocks::FREE)
            && session.start >= block.interval.start
            && session.start < block.interval.end
    })
}

/// Reports every entity of `entity_type` in `old` whose key is gone from `new`.
fn check_entities_kept<F>(
    result: &mut CheckResult,
    old: &DataSet,
    new: &DataSet,
    entity_type: MainType,
    key: &str,
    reason: F,
) where
    F: Fn(&Value) -> String,
{
    let index = |data: &DataSet| -> BTreeMap<String, Value> {
        data.get(entity_type.as_str())
            .into_iter()
            .flatten()
            .filter_map(|entity| Some((entity.get(key).and_then(id_as_string)?, entity.clone())))
            .collect()
    };
    let old_map = index(old);
    let new_map = index(new);

    for (id, entity) in &old_map {
        if !new_map.contains_key(id) {
            result.push(CheckFailure::new(
                entity_type.as_str(),
                Some(id.clone()),
                reason(entity),
            ));
        }
    }
}

fn check_video_library(result: &mut CheckResult, new: &DataSet) {
    let videos = new
        .get(MainType::VideoLibrary.as_str())
        .map(Vec::as_slice)
        .unwrap_or_default();
    for video in videos {
        let has_vid = video
            .get(keys::video_library::VID)
            .and_then(Value::as_str)
            .is_some_and(|vid| !vid.is_empty());
        if !has_vid {
            result.push(CheckFailure::new(
                keys::sources::TOPICS,
                video.get(keys::video_library::ID).and_then(id_as_string),
                format!("Video Session has empty vid info. Session: {}", video),
            ));
        }
    }
}
