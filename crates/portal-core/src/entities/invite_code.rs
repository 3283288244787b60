use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An access code tying an approved applicant's email to portal access.
///
/// At most one code exists per application. `used` only ever flips from
/// `false` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    pub id: String,
    pub code: String,
    pub email: String,
    pub application_id: String,
    #[serde(default)]
    pub used: bool,
    pub generated_at: DateTime<Utc>,
}
