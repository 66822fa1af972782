use async_trait::async_trait;

use crate::errors::CoreError;

/// HTTP method for a dashboard API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Raw response as seen by the normalization layer: status plus body text.
/// Body interpretation (JSON parse, error-field check) happens above.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the API client and the network.
///
/// The real implementation wraps `reqwest`; tests inject a mock so every
/// failure class can be produced deterministically. An implementation only
/// fails on transport-level problems — any response, whatever the status,
/// is returned as a `TransportResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<TransportResponse, CoreError>;
}
