use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::conversation::ConversationTurn;
use crate::models::market::MarketPrice;
use crate::models::model::{Model, ModelId, NewModel};
use crate::models::portfolio::{AggregatedPortfolioResponse, ModelPortfolioResponse};
use crate::models::settings::{CoinConfig, GlobalSettings, ProviderCredential, UpdateInfo};
use crate::models::trade::Trade;

use super::transport::{HttpMethod, Transport};

/// Typed client for the dashboard API.
///
/// Every call funnels through [`ApiClient::request`], which normalizes all
/// failure shapes into `CoreError` variants and emits exactly one `tracing`
/// event per outcome (method, path, status, elapsed, cause). A 2xx body
/// whose JSON object carries a non-null `error` field is treated the same
/// as a transport failure for that call.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn request(
        &self,
        operation: &'static str,
        method: HttpMethod,
        path: String,
        body: Option<Value>,
    ) -> Result<Value, CoreError> {
        let started = Instant::now();
        let result = self.transport.send(method, &path, body).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(operation, %method, %path, elapsed_ms, cause = %e, "api request failed");
                return Err(e);
            }
        };

        if !response.is_success() {
            let err = CoreError::HttpStatus {
                operation: operation.to_string(),
                status: response.status,
            };
            warn!(operation, %method, %path, status = response.status, elapsed_ms, cause = %err,
                "api request failed");
            return Err(err);
        }

        // Mutations may legitimately answer with an empty body.
        let value: Value = if response.body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&response.body) {
                Ok(value) => value,
                Err(e) => {
                    let err = CoreError::malformed(operation, e);
                    warn!(operation, %method, %path, status = response.status, elapsed_ms,
                        cause = %err, "api request failed");
                    return Err(err);
                }
            }
        };

        if let Some(error_field) = value.get("error").filter(|v| !v.is_null()) {
            let message = match error_field {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let err = CoreError::Api {
                operation: operation.to_string(),
                message,
            };
            warn!(operation, %method, %path, status = response.status, elapsed_ms, cause = %err,
                "api request failed");
            return Err(err);
        }

        info!(operation, %method, %path, status = response.status, elapsed_ms, "api request ok");
        Ok(value)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: String,
    ) -> Result<T, CoreError> {
        let value = self.request(operation, HttpMethod::Get, path, None).await?;
        serde_json::from_value(value).map_err(|e| CoreError::malformed(operation, e))
    }

    // ── Models ──────────────────────────────────────────────────────

    pub async fn list_models(&self) -> Result<Vec<Model>, CoreError> {
        self.get("list models", "/api/models".to_string()).await
    }

    pub async fn create_model(&self, new_model: &NewModel) -> Result<Model, CoreError> {
        let body = serde_json::to_value(new_model)
            .map_err(|e| CoreError::malformed("create model", e))?;
        let value = self
            .request(
                "create model",
                HttpMethod::Post,
                "/api/models".to_string(),
                Some(body),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| CoreError::malformed("create model", e))
    }

    pub async fn delete_model(&self, id: ModelId) -> Result<(), CoreError> {
        self.request(
            "delete model",
            HttpMethod::Delete,
            format!("/api/models/{id}"),
            None,
        )
        .await?;
        Ok(())
    }

    // ── Per-model reads ─────────────────────────────────────────────

    pub async fn model_portfolio(&self, id: ModelId) -> Result<ModelPortfolioResponse, CoreError> {
        self.get("model portfolio", format!("/api/models/{id}/portfolio"))
            .await
    }

    pub async fn model_trades(&self, id: ModelId, limit: usize) -> Result<Vec<Trade>, CoreError> {
        self.get(
            "model trades",
            format!("/api/models/{id}/trades?limit={limit}"),
        )
        .await
    }

    pub async fn model_conversations(
        &self,
        id: ModelId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, CoreError> {
        self.get(
            "model conversations",
            format!("/api/models/{id}/conversations?limit={limit}"),
        )
        .await
    }

    // ── Control actions ─────────────────────────────────────────────

    pub async fn execute_trading_cycle(&self, id: ModelId) -> Result<(), CoreError> {
        self.request(
            "execute trading cycle",
            HttpMethod::Post,
            format!("/api/models/{id}/execute"),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn set_auto_trading(&self, id: ModelId, enabled: bool) -> Result<(), CoreError> {
        self.request(
            "toggle auto-trading",
            HttpMethod::Post,
            format!("/api/models/{id}/auto-trading"),
            Some(json!({ "enabled": enabled })),
        )
        .await?;
        Ok(())
    }

    // ── Aggregate & market ──────────────────────────────────────────

    pub async fn aggregated_portfolio(&self) -> Result<AggregatedPortfolioResponse, CoreError> {
        self.get("aggregated portfolio", "/api/portfolio".to_string())
            .await
    }

    pub async fn market_prices(&self) -> Result<HashMap<String, MarketPrice>, CoreError> {
        self.get("market prices", "/api/market/prices".to_string())
            .await
    }

    // ── Settings ────────────────────────────────────────────────────

    pub async fn get_settings(&self) -> Result<GlobalSettings, CoreError> {
        self.get("load settings", "/api/settings".to_string()).await
    }

    pub async fn put_settings(&self, settings: &GlobalSettings) -> Result<(), CoreError> {
        let body = serde_json::to_value(settings)
            .map_err(|e| CoreError::malformed("save settings", e))?;
        self.request(
            "save settings",
            HttpMethod::Put,
            "/api/settings".to_string(),
            Some(body),
        )
        .await?;
        Ok(())
    }

    // ── Provider credentials ────────────────────────────────────────

    pub async fn list_providers(&self) -> Result<Vec<ProviderCredential>, CoreError> {
        self.get("list providers", "/api/providers".to_string())
            .await
    }

    pub async fn create_provider(
        &self,
        provider: &ProviderCredential,
    ) -> Result<ProviderCredential, CoreError> {
        let body = serde_json::to_value(provider)
            .map_err(|e| CoreError::malformed("create provider", e))?;
        let value = self
            .request(
                "create provider",
                HttpMethod::Post,
                "/api/providers".to_string(),
                Some(body),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| CoreError::malformed("create provider", e))
    }

    pub async fn update_provider(&self, provider: &ProviderCredential) -> Result<(), CoreError> {
        let body = serde_json::to_value(provider)
            .map_err(|e| CoreError::malformed("update provider", e))?;
        self.request(
            "update provider",
            HttpMethod::Put,
            format!("/api/providers/{}", provider.id),
            Some(body),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_provider(&self, id: i64) -> Result<(), CoreError> {
        self.request(
            "delete provider",
            HttpMethod::Delete,
            format!("/api/providers/{id}"),
            None,
        )
        .await?;
        Ok(())
    }

    // ── Tracked coins ───────────────────────────────────────────────

    pub async fn list_coins(&self) -> Result<Vec<CoinConfig>, CoreError> {
        self.get("list coins", "/api/coins".to_string()).await
    }

    pub async fn create_coin(&self, coin: &CoinConfig) -> Result<CoinConfig, CoreError> {
        let body =
            serde_json::to_value(coin).map_err(|e| CoreError::malformed("create coin", e))?;
        let value = self
            .request(
                "create coin",
                HttpMethod::Post,
                "/api/coins".to_string(),
                Some(body),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| CoreError::malformed("create coin", e))
    }

    pub async fn delete_coin(&self, symbol: &str) -> Result<(), CoreError> {
        self.request(
            "delete coin",
            HttpMethod::Delete,
            format!("/api/coins/{symbol}"),
            None,
        )
        .await?;
        Ok(())
    }

    // ── Update check ────────────────────────────────────────────────

    pub async fn check_update(&self) -> Result<UpdateInfo, CoreError> {
        self.get("update check", "/api/update-check".to_string())
            .await
    }
}
