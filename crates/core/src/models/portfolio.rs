use serde::{Deserialize, Serialize};

use super::chart::RawSeriesPoint;

/// Which way a position points. There is no third state: a position is
/// either long or short, never both and never neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// One open position inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Coin symbol, e.g. "BTC".
    pub coin: String,

    pub side: PositionSide,

    /// Quantity held; never negative. Zero-quantity positions exist on the
    /// wire but are not rendered.
    pub quantity: f64,

    pub entry_price: f64,

    /// Latest mark price. `None` when market data is stale or missing.
    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default = "default_leverage")]
    pub leverage: f64,

    #[serde(default)]
    pub unrealized_pnl: f64,
}

fn default_leverage() -> f64 {
    1.0
}

/// Account-level snapshot for one model, or for the synthetic aggregate of
/// all models. Never partially aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,

    pub cash: f64,

    #[serde(default)]
    pub realized_pnl: f64,

    #[serde(default)]
    pub unrealized_pnl: f64,

    #[serde(default)]
    pub positions: Vec<Position>,
}

impl PortfolioSnapshot {
    /// Positions worth rendering: quantity strictly greater than zero.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.quantity > 0.0)
    }
}

/// Wire shape of `GET /api/models/{id}/portfolio`.
///
/// `snapshot` is an `Option` on purpose: an ok status with an absent
/// snapshot is a data-load failure, not an empty portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelPortfolioResponse {
    pub snapshot: Option<PortfolioSnapshot>,

    #[serde(default)]
    pub history: Vec<RawSeriesPoint>,

    #[serde(default)]
    pub auto_trading: bool,
}

/// Wire shape of `GET /api/portfolio` (aggregated across all models).
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatedPortfolioResponse {
    pub snapshot: Option<PortfolioSnapshot>,

    /// One value-history series per model, keyed by display name.
    #[serde(default)]
    pub series: std::collections::BTreeMap<String, Vec<RawSeriesPoint>>,
}
