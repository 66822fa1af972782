pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use client::api::ApiClient;
use client::http::HttpTransport;
use client::transport::Transport;
use config::DashboardConfig;
use errors::CoreError;
use models::market::MarketPrice;
use models::model::{Model, ModelId, NewModel};
use models::settings::{CoinConfig, GlobalSettings, ProviderCredential, UpdateInfo};
use models::view::{RenderPlan, ViewState};
use services::actions::{self, ActionOutcome};
use services::fetch;
use services::scheduler::{RefreshScheduler, RefreshTick};
use services::view_state::{FetchTarget, RefreshTicket, ViewController};

/// Main entry point for the dashboard core.
///
/// Owns the view state, the API client, and the refresh scheduler. The
/// presentation layer drives it with user intents (select, execute, pause,
/// CRUD) and timer ticks, and reads back a [`RenderPlan`] after each
/// mutation. All state mutation happens through `&mut self` on the caller's
/// control thread; network reads run concurrently underneath but their
/// results are applied here, guarded by the stale-response ticket check.
#[must_use]
pub struct Dashboard {
    api: ApiClient,
    controller: ViewController,
    scheduler: RefreshScheduler,
    config: DashboardConfig,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("view", self.controller.state())
            .field("models", &self.controller.models().len())
            .field("auto_refresh", &self.scheduler.is_running())
            .finish()
    }
}

impl Dashboard {
    /// Create a dashboard talking to a real server over HTTP.
    pub fn new(config: DashboardConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(&config.base_url));
        Self::with_transport(transport, config)
    }

    /// Create a dashboard with an injected transport (deterministic tests).
    pub fn with_transport(transport: Arc<dyn Transport>, config: DashboardConfig) -> Self {
        let scheduler = RefreshScheduler::new(config.market_refresh, config.portfolio_refresh);
        Self {
            api: ApiClient::new(transport),
            controller: ViewController::new(),
            scheduler,
            config,
        }
    }

    // ── Read-only state ─────────────────────────────────────────────

    #[must_use]
    pub fn view_state(&self) -> &ViewState {
        self.controller.state()
    }

    #[must_use]
    pub fn models(&self) -> &[Model] {
        self.controller.models()
    }

    #[must_use]
    pub fn market(&self) -> &HashMap<String, MarketPrice> {
        self.controller.market()
    }

    #[must_use]
    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    /// Current render description for the presentation adapter.
    #[must_use]
    pub fn render_plan(&self) -> RenderPlan {
        self.controller.render_plan()
    }

    // ── Startup ─────────────────────────────────────────────────────

    /// Load the model list and the aggregated view. Call once at startup,
    /// before arming the auto-refresh timers.
    pub async fn init(&mut self) -> Result<(), CoreError> {
        self.refresh_models().await?;
        self.select_aggregated_view().await
    }

    // ── View selection ──────────────────────────────────────────────

    /// Switch to the aggregated cross-model view and reload its data.
    /// Idempotent when already aggregated — the data still refreshes.
    pub async fn select_aggregated_view(&mut self) -> Result<(), CoreError> {
        let ticket = self.controller.select_aggregated_view();
        self.reload(ticket).await?;
        Ok(())
    }

    /// Switch to a single model's view and reload its data. Unknown ids are
    /// rejected without touching the current view.
    pub async fn select_model(&mut self, model_id: ModelId) -> Result<(), CoreError> {
        let ticket = self.controller.select_model(model_id)?;
        self.reload(ticket).await?;
        Ok(())
    }

    /// Re-fetch whatever the current view shows, without a transition.
    /// Returns `false` when the result arrived stale and was discarded.
    pub async fn refresh_current_view(&mut self) -> Result<bool, CoreError> {
        let ticket = self.controller.current_ticket();
        self.reload(ticket).await
    }

    async fn reload(&mut self, ticket: RefreshTicket) -> Result<bool, CoreError> {
        match ticket.target {
            FetchTarget::Aggregated => {
                let view = fetch::load_aggregated_view(&self.api).await?;
                Ok(self.controller.apply_aggregated_view(ticket, view))
            }
            FetchTarget::Model(model_id) => {
                let view = fetch::load_model_view(
                    &self.api,
                    model_id,
                    self.config.trade_limit,
                    self.config.conversation_limit,
                )
                .await?;
                Ok(self.controller.apply_model_view(ticket, view))
            }
        }
    }

    // ── Model list & lifecycle ──────────────────────────────────────

    pub async fn refresh_models(&mut self) -> Result<(), CoreError> {
        let models = self.api.list_models().await?;
        self.controller.set_models(models);
        Ok(())
    }

    pub async fn create_model(
        &mut self,
        name: impl Into<String>,
        provider_id: Option<i64>,
    ) -> Result<Model, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "model name must not be empty".to_string(),
            ));
        }
        let created = self
            .api
            .create_model(&NewModel { name, provider_id })
            .await?;
        self.refresh_models().await?;
        Ok(created)
    }

    /// Delete a model. Deleting the currently selected model forces the
    /// aggregated view and reloads it; otherwise only the list refreshes.
    pub async fn delete_model(&mut self, model_id: ModelId) -> Result<(), CoreError> {
        self.api.delete_model(model_id).await?;
        let forced = self.controller.on_model_deleted(model_id);
        self.refresh_models().await?;
        if let Some(ticket) = forced {
            self.reload(ticket).await?;
        }
        Ok(())
    }

    // ── Control actions ─────────────────────────────────────────────

    pub async fn execute_trading_cycle(&mut self) -> Result<ActionOutcome, CoreError> {
        actions::execute_trading_cycle(
            &self.api,
            &mut self.controller,
            self.config.trade_limit,
            self.config.conversation_limit,
        )
        .await
    }

    pub async fn pause_auto_trading(&mut self) -> Result<ActionOutcome, CoreError> {
        actions::pause_auto_trading(&self.api, &mut self.controller).await
    }

    // ── Market prices ───────────────────────────────────────────────

    pub async fn refresh_market_prices(&mut self) -> Result<(), CoreError> {
        let prices = self.api.market_prices().await?;
        self.controller.set_market(prices);
        Ok(())
    }

    // ── Auto refresh ────────────────────────────────────────────────

    /// Arm the two refresh timers. The caller drains the returned channel
    /// and feeds each tick to [`handle_tick`](Self::handle_tick). Starting
    /// twice replaces nothing: the scheduler ignores a second start.
    pub fn start_auto_refresh(&mut self) -> mpsc::UnboundedReceiver<RefreshTick> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.scheduler.start(tx);
        rx
    }

    /// Cancel the refresh timers. Safe when already stopped.
    pub fn stop_auto_refresh(&mut self) {
        self.scheduler.stop();
    }

    /// Run the refresh a timer tick asks for. A primary-read failure
    /// propagates but leaves the previously displayed state untouched.
    pub async fn handle_tick(&mut self, tick: RefreshTick) -> Result<(), CoreError> {
        match tick {
            RefreshTick::Market => self.refresh_market_prices().await,
            RefreshTick::Portfolio => {
                self.refresh_current_view().await?;
                Ok(())
            }
        }
    }

    // ── Settings, providers, coins, update check ────────────────────

    pub async fn load_settings(&self) -> Result<GlobalSettings, CoreError> {
        self.api.get_settings().await
    }

    pub async fn save_settings(&self, settings: &GlobalSettings) -> Result<(), CoreError> {
        if settings.fee_rate < 0.0 || settings.fee_rate >= 1.0 {
            return Err(CoreError::ValidationError(format!(
                "fee rate {} out of range [0, 1)",
                settings.fee_rate
            )));
        }
        if settings.trading_frequency_secs == 0 {
            return Err(CoreError::ValidationError(
                "trading frequency must be at least 1 second".to_string(),
            ));
        }
        self.api.put_settings(settings).await
    }

    pub async fn list_providers(&self) -> Result<Vec<ProviderCredential>, CoreError> {
        self.api.list_providers().await
    }

    pub async fn create_provider(
        &self,
        provider: &ProviderCredential,
    ) -> Result<ProviderCredential, CoreError> {
        self.api.create_provider(provider).await
    }

    pub async fn update_provider(&self, provider: &ProviderCredential) -> Result<(), CoreError> {
        self.api.update_provider(provider).await
    }

    pub async fn delete_provider(&self, id: i64) -> Result<(), CoreError> {
        self.api.delete_provider(id).await
    }

    pub async fn list_coins(&self) -> Result<Vec<CoinConfig>, CoreError> {
        self.api.list_coins().await
    }

    pub async fn create_coin(&self, coin: &CoinConfig) -> Result<CoinConfig, CoreError> {
        self.api.create_coin(coin).await
    }

    pub async fn delete_coin(&self, symbol: &str) -> Result<(), CoreError> {
        self.api.delete_coin(symbol).await
    }

    pub async fn check_for_update(&self) -> Result<UpdateInfo, CoreError> {
        self.api.check_update().await
    }
}
