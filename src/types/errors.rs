//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Build-phase
//! kinds abort startup; serve-phase kinds are reported to the single caller
//! that triggered them.

use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the filter.
#[derive(Error, Debug)]
pub enum Error {
    /// A configured allow/deny rule is not a valid regular expression.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Allow/deny rules excluded every upstream tool.
    #[error("no tools remain after applying allow/deny rules")]
    NoToolsRemaining,

    /// Two upstream tools map to the same public name after renaming.
    #[error("tool name collision detected for '{public_name}' (from '{first}' and '{second}')")]
    NameCollision {
        public_name: String,
        first: String,
        second: String,
    },

    /// The synthetic health tool would shadow an exposed upstream tool.
    #[error("health tool name '{0}' collides with an exposed upstream tool")]
    HealthNameCollision(String),

    /// The upstream could not be reached or answered with garbage.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The requested public name is not part of the exposed catalog.
    #[error("tool '{0}' is not exposed by this filter")]
    ToolNotExposed(String),

    /// Tool arguments are not a JSON object.
    #[error("tool arguments must be a JSON object")]
    InvalidArguments,

    /// A key listed in the schema's `required` array is absent.
    #[error("missing required argument '{0}'")]
    MissingRequiredArgument(String),

    /// Keys present in the arguments but not allowed by the schema.
    #[error("arguments contain disallowed fields: {}", .0.join(", "))]
    DisallowedArguments(Vec<String>),

    /// A forwarded call failed at the transport or protocol level.
    #[error("upstream call failed: {0}")]
    UpstreamCallFailed(String),

    /// The upstream answered a forwarded call with a JSON-RPC error. The
    /// error object is kept as received so it reaches the client unchanged.
    #[error("upstream returned error {}: {}", .0.code.0, .0.message)]
    UpstreamRejected(ErrorData),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// The client-facing transport failed to start or stopped abnormally.
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map to a JSON-RPC 2.0 error code for the client-facing protocol.
    pub fn to_rpc_error_code(&self) -> ErrorCode {
        match self {
            Error::ToolNotExposed(_)
            | Error::InvalidArguments
            | Error::MissingRequiredArgument(_)
            | Error::DisallowedArguments(_) => ErrorCode::INVALID_PARAMS,
            Error::UpstreamRejected(data) => ErrorCode(data.code.0),
            _ => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Whether this kind can only occur while building the catalog.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Error::InvalidPattern { .. }
                | Error::NoToolsRemaining
                | Error::NameCollision { .. }
                | Error::HealthNameCollision(_)
                | Error::UpstreamUnavailable(_)
                | Error::Config(_)
        )
    }
}

// Convenience constructors
impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn upstream_call_failed(msg: impl Into<String>) -> Self {
        Self::UpstreamCallFailed(msg.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<Error> for ErrorData {
    fn from(err: Error) -> Self {
        match err {
            Error::UpstreamRejected(data) => data,
            other => ErrorData::new(other.to_rpc_error_code(), other.to_string(), None),
        }
    }
}
