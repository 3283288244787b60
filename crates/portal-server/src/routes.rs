//! Request routing and reply shaping.
//!
//! - `GET /?action=<get_*>`: read actions, no body.
//! - `POST /` with `{"action": .., "data": ..}`: every action.
//! - `GET /blobs/<id>`: stored image proof bytes.
//!
//! Malformed requests never reach the backend; they get a 4xx `{"error"}`.

use std::io::Cursor;

use portal_backend::PortalError;
use portal_core::actions::{Action, ActionEnvelope, Verb};
use serde_json::{Value, json};
use tiny_http::{Header, Method, Response};

/// Largest accepted POST body. Fits a maximum-size image proof as base64.
pub const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

pub type Reply = Response<Cursor<Vec<u8>>>;

#[derive(Debug, PartialEq)]
pub enum Route {
    Action { action: Action, data: Value },
    Blob(String),
    Reject { status: u16, message: String },
}

impl Route {
    fn reject(status: u16, message: impl Into<String>) -> Self {
        Self::Reject {
            status,
            message: message.into(),
        }
    }
}

/// Decide what a request asks for. `body` is empty for anything but `POST`.
pub fn route(method: &Method, url: &str, body: &str) -> Route {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match method {
        Method::Get => {
            if let Some(id) = path.strip_prefix("/blobs/") {
                return match urlencoding::decode(id) {
                    Ok(id) if !id.is_empty() => Route::Blob(id.into_owned()),
                    _ => Route::reject(400, "bad blob id"),
                };
            }
            let Some(name) = query_param(query, "action") else {
                return Route::reject(400, "missing action");
            };
            let action = match Action::from_wire(&name) {
                Ok(action) => action,
                Err(e) => return Route::reject(400, e.to_string()),
            };
            if action.verb() != Verb::Get {
                return Route::reject(400, format!("{action} must be sent as POST"));
            }
            Route::Action {
                action,
                data: Value::Null,
            }
        }
        Method::Post => {
            let envelope: ActionEnvelope = match serde_json::from_str(body) {
                Ok(envelope) => envelope,
                Err(e) => {
                    return Route::reject(
                        400,
                        format!("body must be JSON {{\"action\", \"data\"}}: {e}"),
                    );
                }
            };
            match Action::from_wire(&envelope.action) {
                Ok(action) => Route::Action {
                    action,
                    data: envelope.data,
                },
                Err(e) => Route::reject(400, e.to_string()),
            }
        }
        other => Route::reject(405, format!("method {other} not allowed")),
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(std::borrow::Cow::into_owned)
        .filter(|v| !v.is_empty())
}

/// HTTP status for a failed action.
pub const fn status_for(err: &PortalError) -> u16 {
    match err {
        PortalError::Validation(_) => 400,
        PortalError::NotFound { .. } => 404,
        _ => 500,
    }
}

fn with_content_type(reply: Reply, mime: &str) -> Reply {
    match Header::from_bytes("Content-Type", mime) {
        Ok(header) => reply.with_header(header),
        Err(()) => reply,
    }
}

pub fn json_reply(status: u16, body: &Value) -> Reply {
    with_content_type(
        Response::from_data(body.to_string().into_bytes()).with_status_code(status),
        "application/json",
    )
}

pub fn error_reply(status: u16, message: &str) -> Reply {
    json_reply(status, &json!({ "error": message }))
}

pub fn bytes_reply(mime: &str, data: Vec<u8>) -> Reply {
    with_content_type(Response::from_data(data), mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_read_action() {
        assert_eq!(
            route(&Method::Get, "/?action=get_codes", ""),
            Route::Action {
                action: Action::GetCodes,
                data: Value::Null
            }
        );
    }

    #[test]
    fn get_ignores_other_params_and_path() {
        assert_eq!(
            route(&Method::Get, "/exec?v=2&action=get_config", ""),
            Route::Action {
                action: Action::GetConfig,
                data: Value::Null
            }
        );
    }

    #[test]
    fn get_requires_action() {
        assert!(matches!(
            route(&Method::Get, "/", ""),
            Route::Reject { status: 400, .. }
        ));
        assert!(matches!(
            route(&Method::Get, "/?action=", ""),
            Route::Reject { status: 400, .. }
        ));
    }

    #[test]
    fn unknown_action_is_rejected_with_its_name() {
        let Route::Reject { status, message } = route(&Method::Get, "/?action=drop_all", "") else {
            panic!("expected reject");
        };
        assert_eq!(status, 400);
        assert!(message.contains("drop_all"));
    }

    #[test]
    fn mutations_cannot_travel_as_get() {
        assert!(matches!(
            route(&Method::Get, "/?action=use_code", ""),
            Route::Reject { status: 400, .. }
        ));
    }

    #[test]
    fn post_envelope() {
        let body = r#"{"action":"use_code","data":{"code":"TCP-ABC123"}}"#;
        assert_eq!(
            route(&Method::Post, "/", body),
            Route::Action {
                action: Action::UseCode,
                data: json!({"code": "TCP-ABC123"})
            }
        );
    }

    #[test]
    fn post_without_data_is_null() {
        assert_eq!(
            route(&Method::Post, "/", r#"{"action":"trigger_reminders"}"#),
            Route::Action {
                action: Action::TriggerReminders,
                data: Value::Null
            }
        );
    }

    #[test]
    fn post_garbage_is_rejected() {
        assert!(matches!(
            route(&Method::Post, "/", "action=use_code"),
            Route::Reject { status: 400, .. }
        ));
        assert!(matches!(
            route(&Method::Post, "/", r#"{"action":"nope"}"#),
            Route::Reject { status: 400, .. }
        ));
    }

    #[test]
    fn blob_path() {
        assert_eq!(
            route(&Method::Get, "/blobs/blob-k3x9q0m2a", ""),
            Route::Blob("blob-k3x9q0m2a".into())
        );
        assert!(matches!(
            route(&Method::Get, "/blobs/", ""),
            Route::Reject { status: 400, .. }
        ));
    }

    #[test]
    fn other_methods_are_not_allowed() {
        assert!(matches!(
            route(&Method::Delete, "/?action=get_codes", ""),
            Route::Reject { status: 405, .. }
        ));
    }

    #[test]
    fn failure_statuses() {
        assert_eq!(status_for(&PortalError::Validation("x".into())), 400);
        assert_eq!(
            status_for(&PortalError::NotFound {
                entity: "blob".into(),
                id: "b".into()
            }),
            404
        );
        assert_eq!(status_for(&PortalError::Storage("disk".into())), 500);
    }

    #[test]
    fn error_reply_carries_message() {
        let reply = error_reply(400, "Unknown action: nope");
        assert_eq!(reply.status_code().0, 400);
    }
}
