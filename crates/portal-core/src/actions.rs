//! The action table: every operation the portal exposes over the wire.
//!
//! Each action has a marker type implementing [`ActionSpec`], which pins its
//! wire name, HTTP verb, request type and response type at compile time.
//! `get_*` actions travel as `GET ?action=<name>`; everything else is a
//! `POST` with a JSON body `{"action": <name>, "data": <request>}`.
//!
//! ```
//! use portal_core::actions::{Action, ActionSpec, UseCode, Verb};
//!
//! assert_eq!(UseCode::ACTION.as_str(), "use_code");
//! assert_eq!(Action::GetCodes.verb(), Verb::Get);
//! ```

use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entities::{Application, ClassConfig, InviteCode, NewApplication};
use crate::enums::ApplicationStatus;
use crate::errors::CoreError;
use crate::responses::{Ack, RedeemResponse, RemindersResponse, SubmitResponse};
use crate::updates::ApplicationUpdate;

/// HTTP verb an action travels as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
}

/// Compile-time description of one wire action.
pub trait ActionSpec {
    const ACTION: Action;
    type Request: Serialize + DeserializeOwned + Send + Sync;
    type Response: Serialize + DeserializeOwned + Send;
}

macro_rules! action_table {
    ($( $(#[$doc:meta])* $marker:ident => $name:literal, $verb:ident, $req:ty => $resp:ty; )+) => {
        /// Wire action names.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Action {
            $( $marker, )+
        }

        impl Action {
            /// Every action, in table order.
            pub const ALL: &'static [Self] = &[ $( Self::$marker, )+ ];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$marker => $name, )+
                }
            }

            #[must_use]
            pub const fn verb(self) -> Verb {
                match self {
                    $( Self::$marker => Verb::$verb, )+
                }
            }
        }

        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl ActionSpec for $marker {
                const ACTION: Action = Action::$marker;
                type Request = $req;
                type Response = $resp;
            }
        )+
    };
}

action_table! {
    /// Read the class config. The reply is raw JSON (`{}` when unset) so it
    /// can be migrated before use.
    GetConfig => "get_config", Get, NoData => serde_json::Value;
    /// Overwrite the class config wholesale.
    UpdateConfig => "update_config", Post, ClassConfig => Ack;
    /// Create a pending application.
    SubmitApplication => "submit_application", Post, NewApplication => SubmitResponse;
    /// List every application.
    GetApplications => "get_applications", Get, NoData => Vec<Application>;
    /// Move an application through the status machine.
    UpdateStatus => "update_status", Post, StatusUpdateRequest => Ack;
    /// Shallow-merge fields into an application.
    UpdateApplication => "update_application", Post, UpdateApplicationRequest => Ack;
    /// Issue (or re-issue) the code for an application.
    GenerateCode => "generate_code", Post, GenerateCodeRequest => InviteCode;
    /// List every invite code.
    GetCodes => "get_codes", Get, NoData => Vec<InviteCode>;
    /// Redeem a code.
    UseCode => "use_code", Post, UseCodeRequest => RedeemResponse;
    /// Email session reminders to admitted students.
    TriggerReminders => "trigger_reminders", Post, NoData => RemindersResponse;
}

impl Action {
    /// Look up an action by wire name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an unknown name.
    pub fn from_wire(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown action: {name}")))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s)
    }
}

/// POST body: `{"action": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionEnvelope {
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Request body of actions that take no input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NoData {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusUpdateRequest {
    pub id: String,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UpdateApplicationRequest {
    pub id: String,
    pub fields: ApplicationUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeRequest {
    pub application_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UseCodeRequest {
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_from_wire() {
        for action in Action::ALL {
            assert_eq!(Action::from_wire(action.as_str()).unwrap(), *action);
        }
    }

    #[test]
    fn only_get_prefixed_actions_are_gets() {
        for action in Action::ALL {
            let is_get = action.as_str().starts_with("get_");
            assert_eq!(action.verb() == Verb::Get, is_get, "{action}");
        }
    }

    #[test]
    fn unknown_action_is_a_validation_error() {
        assert!(matches!(
            "drop_tables".parse::<Action>(),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn marker_types_pin_their_action() {
        assert_eq!(GenerateCode::ACTION, Action::GenerateCode);
        assert_eq!(TriggerReminders::ACTION.verb(), Verb::Post);
    }

    #[test]
    fn envelope_data_defaults_to_null() {
        let env: ActionEnvelope = serde_json::from_str(r#"{"action":"trigger_reminders"}"#).unwrap();
        assert_eq!(env.data, serde_json::Value::Null);
    }

    #[test]
    fn generate_code_request_is_camel_case() {
        let req = GenerateCodeRequest {
            application_id: "abc".into(),
            email: "a@b.co".into(),
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            serde_json::json!({"applicationId": "abc", "email": "a@b.co"})
        );
    }
}
