use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read, or a value has the wrong type.
    #[error("failed to load portal config: {0}")]
    Figment(#[from] figment::Error),

    /// A value parsed but breaks a cross-field rule.
    #[error("bad value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
