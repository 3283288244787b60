//! Shared HTTP response helpers for the action client.
//!
//! Centralizes status-code checks and body decoding so the client stays
//! focused on request construction.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RemoteError;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success, else [`RemoteError::Api`] with
/// the status code and the reply's `error` field or raw body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or(body);
        return Err(RemoteError::Api { status, message });
    }
    Ok(resp)
}

/// Decode a reply body as `T`.
///
/// Script endpoints cannot always set a status code, so a 200 reply whose body
/// is exactly `{"error": "..."}` is still reported as [`RemoteError::Api`].
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, RemoteError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| RemoteError::Parse(format!("reply is not JSON: {e}")))?;
    if let Some(message) = error_message_value(&value) {
        return Err(RemoteError::Api { status, message });
    }
    serde_json::from_value(value).map_err(|e| RemoteError::Parse(e.to_string()))
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| error_message_value(&v))
}

fn error_message_value(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.get("error")?.as_str().map(String::from)
}
