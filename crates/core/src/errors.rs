use thiserror::Error;

/// Unified error type for the entire dashboard-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
///
/// Network failures are normalized into five shapes, each tagged with the
/// `operation` that was attempted so log lines and operator messages can say
/// *what* failed, not just *how*.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Network / API ───────────────────────────────────────────────
    /// Transport-level failure: no usable response at all.
    #[error("Network error during {operation}: {message}")]
    Network { operation: String, message: String },

    /// The server answered with a non-success HTTP status.
    #[error("{operation} failed with HTTP status {status}")]
    HttpStatus { operation: String, status: u16 },

    /// The response body could not be parsed into the expected shape.
    #[error("Malformed response for {operation}: {message}")]
    Malformed { operation: String, message: String },

    /// A well-formed 2xx body carrying a business-level `error` field.
    #[error("{operation} rejected by server: {message}")]
    Api { operation: String, message: String },

    /// A structurally valid body missing its required snapshot record.
    /// Distinct from "zero portfolio" — the view must not be cleared.
    #[error("{operation} returned no portfolio snapshot")]
    MissingSnapshot { operation: String },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Unknown model id: {0}")]
    UnknownModel(i64),

    #[error("Action not allowed: {0}")]
    InvalidAction(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// The operation identity this failure was recorded under, if any.
    pub fn operation(&self) -> Option<&str> {
        match self {
            CoreError::Network { operation, .. }
            | CoreError::HttpStatus { operation, .. }
            | CoreError::Malformed { operation, .. }
            | CoreError::Api { operation, .. }
            | CoreError::MissingSnapshot { operation } => Some(operation),
            _ => None,
        }
    }

    /// True for the failure classes that originate from a network read,
    /// i.e. everything a secondary read may degrade on.
    pub fn is_fetch_failure(&self) -> bool {
        self.operation().is_some()
    }

    pub(crate) fn network(operation: &str, e: &reqwest::Error) -> Self {
        // Strip query parameters from URLs embedded in reqwest messages so
        // credentials never end up in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network {
            operation: operation.to_string(),
            message: sanitized,
        }
    }

    pub(crate) fn malformed(operation: &str, e: impl std::fmt::Display) -> Self {
        CoreError::Malformed {
            operation: operation.to_string(),
            message: e.to_string(),
        }
    }
}
