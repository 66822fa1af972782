use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::conversation::ConversationTurn;
use crate::models::market::MarketPrice;
use crate::models::model::{Model, ModelId};
use crate::models::portfolio::PortfolioSnapshot;
use crate::models::trade::Trade;
use crate::models::view::{PositionRow, RenderPlan, TradeRow, ViewMode, ViewState};

use super::aligner::{self, AlignedChart, NamedSeries};
use super::fetch::{AggregatedView, ModelView};

/// What a refresh cycle is fetching data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Aggregated,
    Model(ModelId),
}

/// Tag carried by every in-flight refresh.
///
/// A ticket is minted when the refresh is issued and checked again when the
/// result arrives; results whose ticket no longer matches the current view
/// identity are discarded. This is the only defense against a slow response
/// for a previously-selected model overwriting the view the user has since
/// switched to — in-flight requests are never hard-aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub target: FetchTarget,
    pub epoch: u64,
}

/// Single source of truth for what the dashboard displays.
///
/// All mutation is synchronous; every transition leaves a fully-consistent
/// state and bumps the epoch so in-flight results for the previous view
/// become stale. Scheduler-driven refreshes reuse the current ticket (no
/// bump), so periodic results still apply while the view is unchanged.
pub struct ViewController {
    state: ViewState,
    epoch: u64,
    models: Vec<Model>,
    snapshot: Option<PortfolioSnapshot>,
    chart: AlignedChart,
    trades: Vec<Trade>,
    conversations: Vec<ConversationTurn>,
    market: HashMap<String, MarketPrice>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            state: ViewState::aggregated(),
            epoch: 0,
            models: Vec::new(),
            snapshot: None,
            chart: AlignedChart::Empty,
            trades: Vec::new(),
            conversations: Vec::new(),
            market: HashMap::new(),
        }
    }

    // ── Read-only state ─────────────────────────────────────────────

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn snapshot(&self) -> Option<&PortfolioSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn chart(&self) -> &AlignedChart {
        &self.chart
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn conversations(&self) -> &[ConversationTurn] {
        &self.conversations
    }

    pub fn market(&self) -> &HashMap<String, MarketPrice> {
        &self.market
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Switch to the aggregated view. Idempotent when already there, but a
    /// fresh ticket is still minted so the caller reloads aggregate data.
    pub fn select_aggregated_view(&mut self) -> RefreshTicket {
        self.state = ViewState::aggregated();
        self.bump()
    }

    /// Switch to a single model's view. Rejects unknown ids and leaves the
    /// current state fully unchanged in that case.
    pub fn select_model(&mut self, model_id: ModelId) -> Result<RefreshTicket, CoreError> {
        if !self.models.iter().any(|m| m.id == model_id) {
            return Err(CoreError::UnknownModel(model_id));
        }
        self.state = ViewState::single_model(model_id);
        Ok(self.bump())
    }

    /// React to a model's deletion. If it was the selected model the view
    /// is forced back to aggregated and the returned ticket asks for an
    /// aggregate reload; otherwise only the model list changed.
    pub fn on_model_deleted(&mut self, model_id: ModelId) -> Option<RefreshTicket> {
        self.models.retain(|m| m.id != model_id);
        if self.state.selected_model() == Some(model_id) {
            Some(self.select_aggregated_view())
        } else {
            None
        }
    }

    /// Ticket for a refresh of whatever is currently displayed, without a
    /// transition. Used by timer-driven refreshes.
    pub fn current_ticket(&self) -> RefreshTicket {
        RefreshTicket {
            target: self.current_target(),
            epoch: self.epoch,
        }
    }

    fn current_target(&self) -> FetchTarget {
        match self.state.selected_model() {
            Some(id) => FetchTarget::Model(id),
            None => FetchTarget::Aggregated,
        }
    }

    fn bump(&mut self) -> RefreshTicket {
        self.epoch += 1;
        self.current_ticket()
    }

    fn is_current(&self, ticket: RefreshTicket) -> bool {
        ticket.epoch == self.epoch && ticket.target == self.current_target()
    }

    // ── Applying results ────────────────────────────────────────────

    /// Apply a finished single-model refresh. Returns `false` (and changes
    /// nothing) when the result is stale.
    pub fn apply_model_view(&mut self, ticket: RefreshTicket, view: ModelView) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let FetchTarget::Model(model_id) = ticket.target else {
            return false;
        };

        let series_name = self
            .models
            .iter()
            .find(|m| m.id == model_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| format!("model {model_id}"));

        self.snapshot = Some(view.snapshot);
        self.chart = aligner::align(&[NamedSeries {
            name: series_name,
            points: view.history,
        }]);
        self.trades = view.trades;
        self.conversations = view.conversations;
        // The auto-trading flag is re-derived from the portfolio read, the
        // only place the client trusts for it.
        self.state.set_auto_trading(view.auto_trading);
        true
    }

    /// Apply a finished aggregated refresh. Returns `false` when stale.
    pub fn apply_aggregated_view(&mut self, ticket: RefreshTicket, view: AggregatedView) -> bool {
        if !self.is_current(ticket) || ticket.target != FetchTarget::Aggregated {
            return false;
        }
        self.snapshot = Some(view.snapshot);
        self.chart = view.chart;
        self.trades.clear();
        self.conversations.clear();
        true
    }

    /// Record a server-confirmed auto-trading flag change. Only the action
    /// executor calls this, strictly after confirmation.
    pub fn confirm_auto_trading(&mut self, enabled: bool) {
        self.state.set_auto_trading(enabled);
    }

    /// Replace the cached model list.
    pub fn set_models(&mut self, models: Vec<Model>) {
        self.models = models;
    }

    /// Apply fresh market prices and reconcile open positions' mark prices.
    /// Market data is cross-view, so no ticket is needed.
    pub fn set_market(&mut self, prices: HashMap<String, MarketPrice>) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            for position in snapshot.positions.iter_mut() {
                if let Some(market) = prices.get(&position.coin) {
                    position.current_price = Some(market.price);
                }
            }
        }
        self.market = prices;
    }

    // ── Render description ──────────────────────────────────────────

    /// Pure function from current state to what the UI should show.
    pub fn render_plan(&self) -> RenderPlan {
        let title = match self.state.selected_model() {
            Some(id) => self
                .models
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("model {id}")),
            None => "All Models".to_string(),
        };

        let auto_trading_label = match self.state.mode() {
            ViewMode::Aggregated => "—".to_string(),
            ViewMode::SingleModel if self.state.auto_trading_enabled() => "Running".to_string(),
            ViewMode::SingleModel => "Paused".to_string(),
        };

        let positions = self
            .snapshot
            .iter()
            .flat_map(|s| s.open_positions())
            .map(|p| PositionRow {
                coin: p.coin.clone(),
                side: p.side.to_string(),
                quantity: p.quantity,
                entry_price: p.entry_price,
                current_price: p
                    .current_price
                    .map(format_price)
                    .unwrap_or_else(|| "—".to_string()),
                leverage: p.leverage,
                unrealized_pnl: format_signed(p.unrealized_pnl),
            })
            .collect();

        let trades = self
            .trades
            .iter()
            .map(|t| TradeRow {
                timestamp: t.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                coin: t.coin.clone(),
                signal_label: t.signal.label().to_string(),
                quantity: t.quantity,
                price: t.price,
                realized_pnl: t.pnl_display(),
                fee: t.fee,
            })
            .collect();

        RenderPlan {
            mode: self.state.mode(),
            title,
            show_detail_tabs: self.state.detail_tabs_visible(),
            auto_trading_label,
            total_value: self.snapshot.as_ref().map(|s| s.total_value),
            cash: self.snapshot.as_ref().map(|s| s.cash),
            realized_pnl: self.snapshot.as_ref().map(|s| s.realized_pnl),
            unrealized_pnl: self.snapshot.as_ref().map(|s| s.unrealized_pnl),
            positions,
            trades,
            chart_empty: self.chart.is_empty(),
        }
    }
}

fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("{price:.2}")
    } else {
        format!("{price:.6}")
    }
}

fn format_signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}
