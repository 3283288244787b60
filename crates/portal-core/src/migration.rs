//! Class config schema migration.
//!
//! Stored configs carry `schemaVersion`. Every load runs the raw JSON through
//! [`migrate_config`], which upgrades it step by step to
//! [`CURRENT_SCHEMA_VERSION`] before deserializing:
//!
//! - **v0** (no `schemaVersion`): the flat shape the first portal shipped.
//!   Collections may be missing, `tasks` may be plain strings, and
//!   `acceptingApplications`/`capacity` may be absent.
//! - **v1**: full shape, but tasks and challenges lack `proofType`, and
//!   challenges may lack `xp`.
//! - **v2**: current.

use serde_json::{Map, Value, json};

use crate::entities::{CURRENT_SCHEMA_VERSION, ClassConfig};
use crate::errors::CoreError;

const DEFAULT_CAPACITY: u64 = 30;
const DEFAULT_CHALLENGE_XP: u64 = 10;

/// Upgrade a stored config document and deserialize it.
///
/// `null` and `{}` (the remote reply when nothing was saved yet) yield the
/// built-in default config.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the document is not an object, claims a
/// newer schema version than this build understands, or does not match the
/// schema after migration.
pub fn migrate_config(raw: Value) -> Result<ClassConfig, CoreError> {
    let mut doc = match raw {
        Value::Null => return Ok(ClassConfig::default()),
        Value::Object(map) if map.is_empty() => return Ok(ClassConfig::default()),
        Value::Object(map) => map,
        other => {
            return Err(CoreError::Validation(format!(
                "config must be a JSON object, got {other}"
            )));
        }
    };

    let version = doc
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(CoreError::Validation(format!(
            "config schema version {version} is newer than supported version {CURRENT_SCHEMA_VERSION}"
        )));
    }

    if version < 1 {
        upgrade_v0_to_v1(&mut doc);
    }
    if version < 2 {
        upgrade_v1_to_v2(&mut doc);
    }
    doc.insert("schemaVersion".into(), json!(CURRENT_SCHEMA_VERSION));

    serde_json::from_value(Value::Object(doc))
        .map_err(|e| CoreError::Validation(format!("config does not match schema: {e}")))
}

fn upgrade_v0_to_v1(doc: &mut Map<String, Value>) {
    let defaults = ClassConfig::default();
    doc.entry("title").or_insert_with(|| json!(defaults.title));
    doc.entry("description")
        .or_insert_with(|| json!(defaults.description));
    doc.entry("acceptingApplications").or_insert(json!(true));
    doc.entry("capacity").or_insert(json!(DEFAULT_CAPACITY));
    for key in ["tasks", "resources", "sessions", "questSets"] {
        doc.entry(key).or_insert_with(|| json!([]));
    }

    if let Some(Value::Array(tasks)) = doc.get_mut("tasks") {
        for (idx, task) in tasks.iter_mut().enumerate() {
            if let Value::String(title) = task {
                let title = title.clone();
                *task = json!({ "id": format!("t{}", idx + 1), "title": title });
            }
        }
    }
}

fn upgrade_v1_to_v2(doc: &mut Map<String, Value>) {
    fn default_proof_type(items: Option<&mut Value>) {
        if let Some(Value::Array(items)) = items {
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                item.entry("proofType").or_insert(json!("text"));
            }
        }
    }

    default_proof_type(doc.get_mut("tasks"));

    if let Some(Value::Array(quests)) = doc.get_mut("questSets") {
        for quest in quests.iter_mut().filter_map(Value::as_object_mut) {
            default_proof_type(quest.get_mut("tasks"));
            let Some(Value::Array(modules)) = quest.get_mut("modules") else {
                continue;
            };
            for module in modules.iter_mut().filter_map(Value::as_object_mut) {
                let Some(challenges) = module.get_mut("challenges") else {
                    continue;
                };
                default_proof_type(Some(&mut *challenges));
                if let Value::Array(challenges) = challenges {
                    for challenge in challenges.iter_mut().filter_map(Value::as_object_mut) {
                        challenge.entry("xp").or_insert(json!(DEFAULT_CHALLENGE_XP));
                    }
                }
            }
        }
    }
}
