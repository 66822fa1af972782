use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Trading signal attached to a recorded trade.
///
/// The recognized vocabulary is closed (enter long, enter short, close);
/// anything else the server sends is preserved as `Other` and rendered with
/// a neutral label instead of failing the whole trade list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TradeSignal {
    EnterLong,
    EnterShort,
    Close,
    Other(String),
}

impl TradeSignal {
    pub fn from_wire(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "buy" | "buy_to_enter" | "enter_long" | "long" => TradeSignal::EnterLong,
            "sell" | "sell_to_enter" | "enter_short" | "short" => TradeSignal::EnterShort,
            "close" | "close_long" | "close_short" | "sell_to_close" | "buy_to_close" => {
                TradeSignal::Close
            }
            _ => TradeSignal::Other(raw.to_string()),
        }
    }

    /// Label for display. Unrecognized signals fall back to the raw text,
    /// or a dash when the raw text is empty — never an error.
    pub fn label(&self) -> &str {
        match self {
            TradeSignal::EnterLong => "OPEN LONG",
            TradeSignal::EnterShort => "OPEN SHORT",
            TradeSignal::Close => "CLOSE",
            TradeSignal::Other(raw) if !raw.is_empty() => raw,
            TradeSignal::Other(_) => "—",
        }
    }
}

impl<'de> Deserialize<'de> for TradeSignal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TradeSignal::from_wire(&raw))
    }
}

/// One recorded trade. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,

    pub coin: String,

    pub signal: TradeSignal,

    pub quantity: f64,

    pub price: f64,

    #[serde(default)]
    pub realized_pnl: f64,

    #[serde(default)]
    pub fee: f64,
}

impl Trade {
    /// Signed P&L text: "+12.50" / "-3.00". Sign formatting is independent
    /// of whether the signal was recognized.
    pub fn pnl_display(&self) -> String {
        if self.realized_pnl >= 0.0 {
            format!("+{:.2}", self.realized_pnl)
        } else {
            format!("{:.2}", self.realized_pnl)
        }
    }
}
