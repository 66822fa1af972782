use serde::Serialize;

use super::model::ModelId;

/// What the dashboard is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewMode {
    /// Cross-model summary; no single model selected.
    Aggregated,
    /// One model's detail view.
    SingleModel,
}

/// The single source of truth for "what is displayed".
///
/// Invariant: `mode == Aggregated ⇔ selected_model == None`. The field is
/// private and only the constructors below can build a state, so the two
/// can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    mode: ViewMode,
    selected_model: Option<ModelId>,
    /// Meaningful only in single-model mode; always `false` while aggregated.
    auto_trading_enabled: bool,
}

impl ViewState {
    pub fn aggregated() -> Self {
        Self {
            mode: ViewMode::Aggregated,
            selected_model: None,
            auto_trading_enabled: false,
        }
    }

    pub fn single_model(id: ModelId) -> Self {
        Self {
            mode: ViewMode::SingleModel,
            selected_model: Some(id),
            auto_trading_enabled: false,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected_model(&self) -> Option<ModelId> {
        self.selected_model
    }

    pub fn auto_trading_enabled(&self) -> bool {
        self.auto_trading_enabled
    }

    /// Update the cached auto-trading flag. Ignored in aggregated mode,
    /// where the flag must stay false.
    pub fn set_auto_trading(&mut self, enabled: bool) {
        if self.mode == ViewMode::SingleModel {
            self.auto_trading_enabled = enabled;
        }
    }

    /// Per-model detail tabs are visible exactly when a model is selected.
    pub fn detail_tabs_visible(&self) -> bool {
        self.mode == ViewMode::SingleModel
    }
}

/// One displayable position row. Quantity is always > 0 here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRow {
    pub coin: String,
    pub side: String,
    pub quantity: f64,
    pub entry_price: f64,
    /// Formatted mark price, or "—" when market data is missing.
    pub current_price: String,
    pub leverage: f64,
    pub unrealized_pnl: String,
}

/// One displayable trade row. The signal label degrades to neutral text
/// for unrecognized signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub timestamp: String,
    pub coin: String,
    pub signal_label: String,
    pub quantity: f64,
    pub price: f64,
    pub realized_pnl: String,
    pub fee: f64,
}

/// Pure description of what the presentation layer should show.
/// The core computes it; a separate adapter applies it to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub mode: ViewMode,
    pub title: String,
    pub show_detail_tabs: bool,
    pub auto_trading_label: String,
    pub total_value: Option<f64>,
    pub cash: Option<f64>,
    pub realized_pnl: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    pub positions: Vec<PositionRow>,
    pub trades: Vec<TradeRow>,
    /// True when the chart has no data at all and the dedicated empty
    /// visualization should be rendered instead of a flat line.
    pub chart_empty: bool,
}
