use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ProofType, ResourceKind};

/// Schema version stamped on every saved config. See [`crate::migration`].
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

const fn default_true() -> bool {
    true
}

const fn default_challenge_xp() -> u32 {
    10
}

/// Process-wide description of the open class.
///
/// Saved as a whole document: writers replace it wholesale and concurrent
/// writers are last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassConfig {
    pub schema_version: u32,
    pub title: String,
    pub description: String,
    pub accepting_applications: bool,
    pub capacity: u32,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    #[serde(default)]
    pub resources: Vec<ClassResource>,
    #[serde(default)]
    pub sessions: Vec<ClassSession>,
    #[serde(default)]
    pub quest_sets: Vec<QuestSet>,
}

/// A task applicants complete when applying.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub proof_type: ProofType,
    #[serde(default = "default_true")]
    pub required: bool,
}

/// A content link shown to admitted students.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassResource {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub kind: ResourceKind,
}

/// A scheduled meeting. `date` is `YYYY-MM-DD`, `time` is `HH:MM` (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
}

impl ClassSession {
    /// Start instant, if `date`/`time` parse. A missing time means midnight.
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let time = match self.time.trim() {
            "" => NaiveTime::MIN,
            t => NaiveTime::parse_from_str(t, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
                .ok()?,
        };
        Some(date.and_time(time).and_utc())
    }
}

/// A themed bundle applicants can apply to independently of the default class.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestSet {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    #[serde(default)]
    pub sessions: Vec<ClassSession>,
    #[serde(default)]
    pub resources: Vec<ClassResource>,
    #[serde(default)]
    pub modules: Vec<LearningModule>,
}

/// A curriculum unit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub challenges: Vec<LearningChallenge>,
}

/// A gamified sub-task of a module, awarding `xp` once its proof is approved.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningChallenge {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_challenge_xp")]
    pub xp: u32,
    #[serde(default)]
    pub proof_type: ProofType,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            title: "Builders Class".to_string(),
            description: "An invite-only class. Apply, complete the tasks, and wait for your access code."
                .to_string(),
            accepting_applications: true,
            capacity: 30,
            tasks: vec![
                TaskConfig {
                    id: "t1".to_string(),
                    title: "Share your social handle".to_string(),
                    description: "The handle you use most, e.g. @you.".to_string(),
                    proof_type: ProofType::Text,
                    required: true,
                },
                TaskConfig {
                    id: "t2".to_string(),
                    title: "Link something you built".to_string(),
                    description: "A repository, demo, or write-up.".to_string(),
                    proof_type: ProofType::Link,
                    required: false,
                },
            ],
            resources: Vec::new(),
            sessions: Vec::new(),
            quest_sets: Vec::new(),
        }
    }
}

impl ClassConfig {
    #[must_use]
    pub fn quest_set(&self, id: &str) -> Option<&QuestSet> {
        self.quest_sets.iter().find(|q| q.id == id)
    }

    /// Application tasks for the targeted class: the quest set's own tasks, or
    /// the global list. `None` if the quest set does not exist.
    #[must_use]
    pub fn tasks_for(&self, quest_set_id: Option<&str>) -> Option<&[TaskConfig]> {
        match quest_set_id {
            Some(id) => self.quest_set(id).map(|q| q.tasks.as_slice()),
            None => Some(self.tasks.as_slice()),
        }
    }

    /// Sessions an applicant of the targeted class attends: global sessions
    /// plus those of the quest set.
    #[must_use]
    pub fn sessions_for(&self, quest_set_id: Option<&str>) -> Vec<&ClassSession> {
        let mut sessions: Vec<&ClassSession> = self.sessions.iter().collect();
        if let Some(quest) = quest_set_id.and_then(|id| self.quest_set(id)) {
            sessions.extend(quest.sessions.iter());
        }
        sessions
    }

    /// Every challenge across all quest sets and modules.
    pub fn challenges(&self) -> impl Iterator<Item = &LearningChallenge> {
        self.quest_sets
            .iter()
            .flat_map(|q| q.modules.iter())
            .flat_map(|m| m.challenges.iter())
    }

    #[must_use]
    pub fn find_challenge(&self, challenge_id: &str) -> Option<&LearningChallenge> {
        self.challenges().find(|c| c.id == challenge_id)
    }

    /// Declared proof type for a task or challenge id, searching the targeted
    /// task list first and then every challenge.
    #[must_use]
    pub fn declared_proof_type(&self, quest_set_id: Option<&str>, key: &str) -> Option<ProofType> {
        self.tasks_for(quest_set_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == key))
            .map(|t| t.proof_type)
            .or_else(|| self.find_challenge(key).map(|c| c.proof_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(date: &str, time: &str) -> ClassSession {
        ClassSession {
            id: "s1".into(),
            title: "Kickoff".into(),
            date: date.into(),
            time: time.into(),
            location: "Room 4".into(),
        }
    }

    fn quest_config() -> ClassConfig {
        ClassConfig {
            quest_sets: vec![QuestSet {
                id: "q-rust".into(),
                title: "Rust quest".into(),
                description: String::new(),
                tasks: vec![TaskConfig {
                    id: "qt1".into(),
                    title: "Show a crate".into(),
                    description: String::new(),
                    proof_type: ProofType::Link,
                    required: true,
                }],
                sessions: vec![session("2026-11-02", "18:00")],
                resources: Vec::new(),
                modules: vec![LearningModule {
                    id: "m1".into(),
                    title: "Ownership".into(),
                    description: String::new(),
                    challenges: vec![LearningChallenge {
                        id: "c1".into(),
                        title: "Borrow checker kata".into(),
                        description: String::new(),
                        xp: 50,
                        proof_type: ProofType::Image,
                    }],
                }],
            }],
            sessions: vec![session("2026-11-01", "")],
            ..ClassConfig::default()
        }
    }

    #[test]
    fn session_start_parses_date_and_time() {
        let start = session("2026-11-01", "18:30").starts_at().unwrap();
        assert_eq!(start.to_rfc3339(), "2026-11-01T18:30:00+00:00");
    }

    #[test]
    fn session_without_time_starts_at_midnight() {
        let start = session("2026-11-01", "").starts_at().unwrap();
        assert_eq!(start.to_rfc3339(), "2026-11-01T00:00:00+00:00");
    }

    #[test]
    fn session_with_garbage_date_has_no_start() {
        assert!(session("next tuesday", "18:00").starts_at().is_none());
    }

    #[test]
    fn tasks_for_unknown_quest_is_none() {
        let config = quest_config();
        assert!(config.tasks_for(Some("missing")).is_none());
        assert_eq!(config.tasks_for(None).unwrap().len(), 2);
        assert_eq!(config.tasks_for(Some("q-rust")).unwrap()[0].id, "qt1");
    }

    #[test]
    fn sessions_for_quest_include_global_sessions() {
        let config = quest_config();
        assert_eq!(config.sessions_for(None).len(), 1);
        assert_eq!(config.sessions_for(Some("q-rust")).len(), 2);
    }

    #[test]
    fn declared_proof_type_covers_tasks_and_challenges() {
        let config = quest_config();
        assert_eq!(config.declared_proof_type(None, "t2"), Some(ProofType::Link));
        assert_eq!(config.declared_proof_type(Some("q-rust"), "qt1"), Some(ProofType::Link));
        assert_eq!(config.declared_proof_type(None, "c1"), Some(ProofType::Image));
        assert_eq!(config.declared_proof_type(None, "nope"), None);
    }
}
