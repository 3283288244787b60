//! Response bodies returned by the action endpoint.
//!
//! These structs fix the JSON shape of each action's reply so the local
//! store, the remote endpoint and the CLI agree on one wire format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Application;

/// `{success:true}` or `{success:false, message}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Response from `submit_application`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub app: Application,
}

/// Response from `use_code`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RedeemResponse {
    pub valid: bool,
}

/// Response from `trigger_reminders`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RemindersResponse {
    pub sent: u32,
}

/// Outcome of approving many applications at once. Never rolled back: ids in
/// `approved` stay approved even when others fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub approved: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.approved.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub application_id: String,
    pub error: String,
}

/// XP progress of one student.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub application_id: String,
    pub xp: u32,
    pub level: u32,
    pub approved_challenges: u32,
    pub total_challenges: u32,
    pub pending_review: Vec<String>,
}
