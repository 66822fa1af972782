use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::errors::CoreError;

use super::transport::{HttpMethod, Transport, TransportResponse};

/// `reqwest`-backed transport against the dashboard API server.
///
/// Timeout handling is delegated here: a transport timeout surfaces as a
/// `reqwest` error and therefore as `CoreError::Network` — the layers above
/// impose no timers of their own.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<TransportResponse, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        let request = match body {
            Some(json) => request.json(&json),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::network(path, &e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::network(path, &e))?;

        Ok(TransportResponse { status, body })
    }
}
