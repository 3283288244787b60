//! # portal-remote
//!
//! HTTP client for a remote portal action endpoint (a spreadsheet-backed
//! script or a `portal-server` instance).
//!
//! Every call is one of the actions in [`portal_core::actions`]: `get_*`
//! actions are sent as `GET <endpoint>?action=<name>`, everything else as a
//! `POST` with body `{"action": <name>, "data": <request>}`. The client does
//! not retry or cache; each call is bounded by the configured timeout.

mod error;
mod http;

pub use error::RemoteError;

use std::time::Duration;

use portal_core::actions::{Action, ActionEnvelope, ActionSpec, Verb};

use crate::http::{check_response, decode_body};

/// HTTP client bound to one remote action endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl RemoteClient {
    /// Create a client for `endpoint` with a per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidEndpoint`] if the URL is not http(s), or
    /// [`RemoteError::Http`] if the underlying client fails to build.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RemoteError::InvalidEndpoint(endpoint.to_string()));
        }
        let http = reqwest::Client::builder()
            .user_agent("class-portal/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke action `A` with a typed request and decode its typed reply.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure, timeout, non-success
    /// status, an `{error}` reply, or a reply that does not match
    /// `A::Response`.
    pub async fn call<A: ActionSpec>(
        &self,
        request: &A::Request,
    ) -> Result<A::Response, RemoteError> {
        let data = serde_json::to_value(request)
            .map_err(|e| RemoteError::Parse(format!("request for {}: {e}", A::ACTION)))?;
        let (status, body) = self.send(A::ACTION, data).await?;
        decode_body(status, &body)
    }

    async fn send(
        &self,
        action: Action,
        data: serde_json::Value,
    ) -> Result<(u16, String), RemoteError> {
        tracing::debug!(%action, endpoint = %self.endpoint, "remote call");
        let request = match action.verb() {
            Verb::Get => self.http.get(self.get_url(action)),
            Verb::Post => self.http.post(&self.endpoint).json(&ActionEnvelope {
                action: action.as_str().to_string(),
                data,
            }),
        };
        let resp = request.send().await.map_err(|e| self.transport_error(e))?;
        let resp = check_response(resp).await?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        Ok((status, body))
    }

    fn get_url(&self, action: Action) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}action={}",
            self.endpoint,
            urlencoding::encode(action.as_str())
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            RemoteError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use portal_core::actions::{GetCodes, NoData};
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    use super::*;

    fn client(endpoint: &str) -> RemoteClient {
        RemoteClient::new(endpoint, Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn get_url_appends_action_query() {
        let c = client("https://script.example.com/macros/s/abc/exec");
        assert_eq!(
            c.get_url(Action::GetCodes),
            "https://script.example.com/macros/s/abc/exec?action=get_codes"
        );
    }

    #[test]
    fn get_url_extends_existing_query() {
        let c = client("http://127.0.0.1:8787/?key=1");
        assert_eq!(
            c.get_url(Action::GetConfig),
            "http://127.0.0.1:8787/?key=1&action=get_config"
        );
    }

    #[test]
    fn rejects_non_http_endpoint() {
        assert!(matches!(
            RemoteClient::new("ftp://files", Duration::from_secs(1)),
            Err(RemoteError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn endpoint_is_trimmed() {
        assert_eq!(client("  http://localhost:1/  ").endpoint(), "http://localhost:1/");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let c = RemoteClient::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        let err = c.call::<GetCodes>(&NoData {}).await.unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Http(_) | RemoteError::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn silent_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let c = RemoteClient::new(&format!("http://{addr}/"), Duration::from_secs(1)).unwrap();
        let started = std::time::Instant::now();
        let err = c.call::<GetCodes>(&NoData {}).await.unwrap_err();
        assert!(matches!(err, RemoteError::Timeout { secs: 1 }), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
        hold.abort();
    }
}
