use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("server has no IP listen address")]
    NoAddress,

    #[error("server loop panicked: {0}")]
    Join(String),
}
