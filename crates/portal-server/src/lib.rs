//! # portal-server
//!
//! The remote action endpoint: the same wire contract the remote backend
//! speaks, served over a [`LocalBackend`] with `tiny_http`.
//!
//! `tiny_http` blocks in `recv()`, so the accept loop runs on a
//! `spawn_blocking` thread and drives each action on the tokio runtime with
//! `Handle::block_on`. Requests are handled strictly one at a time.
//!
//! ```no_run
//! # async fn demo(backend: std::sync::Arc<portal_backend::LocalBackend>) -> Result<(), portal_server::ServerError> {
//! let handle = portal_server::PortalServer::bind("127.0.0.1:0", backend)?.spawn();
//! println!("listening on {}", handle.url());
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod routes;

pub use error::ServerError;

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;

use portal_backend::{LocalBackend, dispatch};
use portal_core::actions::Action;
use serde_json::Value;
use tiny_http::{Method, Request, Server};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use routes::{MAX_BODY_BYTES, Reply, Route};

pub struct PortalServer {
    server: Arc<Server>,
    addr: SocketAddr,
    public_url: String,
    backend: Arc<LocalBackend>,
}

impl PortalServer {
    /// Bind the endpoint. Use port `0` for an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if the address cannot be bound.
    pub fn bind(addr: &str, backend: Arc<LocalBackend>) -> Result<Self, ServerError> {
        let server = Server::http(addr).map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        let addr = server.server_addr().to_ip().ok_or(ServerError::NoAddress)?;
        Ok(Self {
            server: Arc::new(server),
            addr,
            public_url: format!("http://{addr}"),
            backend,
        })
    }

    /// Base URL clients reach this endpoint at, when it differs from the
    /// bound address (behind a proxy, or bound to `0.0.0.0`). Hosted image
    /// proofs are stored as `<public_url>/blobs/<id>`.
    #[must_use]
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into();
        self
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the accept loop on the blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(self) -> ServerHandle {
        self.backend.host_blobs_at(&self.public_url);
        let runtime = Handle::current();
        let server = Arc::clone(&self.server);
        let addr = self.addr;
        let task = tokio::task::spawn_blocking(move || self.run(&runtime));
        ServerHandle { server, addr, task }
    }

    fn run(&self, runtime: &Handle) {
        tracing::info!(addr = %self.addr, "portal endpoint listening");
        loop {
            match self.server.recv() {
                Ok(request) => self.serve_one(runtime, request),
                Err(e) => {
                    tracing::debug!(error = %e, "accept loop stopped");
                    break;
                }
            }
        }
    }

    fn serve_one(&self, runtime: &Handle, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = match read_body(&mut request) {
            Ok(body) => match routes::route(&method, &url, &body) {
                Route::Action { action, data } => runtime.block_on(self.run_action(action, data)),
                Route::Blob(id) => runtime.block_on(self.fetch_blob(&id)),
                Route::Reject { status, message } => {
                    tracing::debug!(%method, %url, status, %message, "rejected request");
                    routes::error_reply(status, &message)
                }
            },
            Err(reply) => reply,
        };

        let status = reply.status_code().0;
        tracing::debug!(%method, %url, status, "handled request");
        if let Err(e) = request.respond(reply) {
            tracing::warn!(error = %e, "failed to write response");
        }
    }

    async fn run_action(&self, action: Action, data: Value) -> Reply {
        match dispatch(self.backend.as_ref(), action, data).await {
            Ok(body) => routes::json_reply(200, &body),
            Err(e) => {
                tracing::warn!(%action, error = %e, "action failed");
                routes::error_reply(routes::status_for(&e), &e.to_string())
            }
        }
    }

    async fn fetch_blob(&self, id: &str) -> Reply {
        match self.backend.get_blob(id).await {
            Ok(blob) => routes::bytes_reply(&blob.mime, blob.data),
            Err(e) => routes::error_reply(routes::status_for(&e), &e.to_string()),
        }
    }
}

/// Read a POST body, refusing anything over [`MAX_BODY_BYTES`].
fn read_body(request: &mut Request) -> Result<String, Reply> {
    if *request.method() != Method::Post {
        return Ok(String::new());
    }
    let mut body = String::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_string(&mut body)
        .map_err(|e| routes::error_reply(400, &format!("unreadable body: {e}")))?;
    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(routes::error_reply(413, "request body too large"));
    }
    Ok(body)
}

/// A running endpoint. Dropping the handle leaves the server running until
/// the process exits; call [`ServerHandle::shutdown`] to stop it.
pub struct ServerHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients use as their backend endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Stop accepting requests and wait for the loop to exit. A request in
    /// flight is answered first.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Join` if the accept loop panicked.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.server.unblock();
        self.task
            .await
            .map_err(|e| ServerError::Join(e.to_string()))?;
        tracing::info!(addr = %self.addr, "portal endpoint stopped");
        Ok(())
    }
}
