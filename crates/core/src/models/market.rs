use serde::{Deserialize, Serialize};

/// Latest market data for one symbol, from `GET /api/market/prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
    pub price: f64,

    /// Percentage change over the last 24 hours.
    #[serde(default)]
    pub change_24h: f64,

    /// Display name, e.g. "Bitcoin".
    #[serde(default)]
    pub name: String,
}
