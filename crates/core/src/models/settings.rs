use serde::{Deserialize, Serialize};

/// Global platform settings, round-tripped via `GET/PUT /api/settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Seconds between automatic trading cycles.
    pub trading_frequency_secs: u64,

    /// Per-side trade fee rate, e.g. 0.001 for 0.1%.
    pub fee_rate: f64,

    /// Whether conversation prompts include the system prompt text.
    #[serde(default)]
    pub show_system_prompt: bool,

    /// Start of the daily auto-trading window, "HH:MM". `None` = always on.
    #[serde(default)]
    pub auto_trading_start: Option<String>,

    /// End of the daily auto-trading window, "HH:MM".
    #[serde(default)]
    pub auto_trading_end: Option<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            trading_frequency_secs: 180,
            fee_rate: 0.001,
            show_system_prompt: true,
            auto_trading_start: None,
            auto_trading_end: None,
        }
    }
}

/// An AI provider credential record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCredential {
    #[serde(default)]
    pub id: i64,

    pub name: String,

    pub base_url: String,

    pub api_key: String,

    /// Provider-side model identifier, e.g. "gpt-4o".
    #[serde(default)]
    pub model_name: Option<String>,
}

/// A tracked coin entry from the configuration UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinConfig {
    pub symbol: String,

    pub name: String,

    #[serde(default)]
    pub exchange: String,

    /// Market-data source identifier, e.g. "bitcoin" for BTC.
    #[serde(default)]
    pub market_id: Option<String>,
}

/// Result of `GET /api/update-check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub current_version: String,

    pub latest_version: String,

    #[serde(default)]
    pub release_notes: String,

    #[serde(default)]
    pub release_url: String,
}

impl UpdateInfo {
    /// Whether the server reports a version different from the one running.
    /// Plain inequality: the server decides what "latest" means.
    pub fn update_available(&self) -> bool {
        !self.latest_version.is_empty() && self.latest_version != self.current_version
    }
}
