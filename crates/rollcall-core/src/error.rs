use thiserror::Error;

/// Errors raised below the database layer: configuration, schedule shape and
/// wiring mistakes.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unusable settings, reported at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A schedule or time value that cannot describe a session.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A handler ran without a dependency the router should have injected.
    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
