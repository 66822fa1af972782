use std::time::Duration;

/// Client-side configuration for the dashboard core.
///
/// The defaults mirror the platform's stock cadences: market prices tick
/// every 5 seconds, portfolio/position/trade state every 10 seconds.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the dashboard API server (no trailing slash).
    pub base_url: String,

    /// Period of the fast market-price refresh timer.
    pub market_refresh: Duration,

    /// Period of the slower portfolio/trade refresh timer.
    pub portfolio_refresh: Duration,

    /// Maximum number of trades requested per refresh.
    pub trade_limit: usize,

    /// Maximum number of conversation turns requested per refresh.
    pub conversation_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5002".to_string(),
            market_refresh: Duration::from_secs(5),
            portfolio_refresh: Duration::from_secs(10),
            trade_limit: 50,
            conversation_limit: 20,
        }
    }
}

impl DashboardConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
