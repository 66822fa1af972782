use serde::{Deserialize, Serialize};

/// Server-issued identifier of a trading model. Stable for the model's lifetime.
pub type ModelId = i64;

/// A trading model registered on the server.
///
/// The auto-trading flag here is a cached copy — the authoritative value
/// lives server-side and is re-read with every portfolio refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,

    /// Display name shown in the model list and chart legend.
    pub name: String,

    /// Reference to the AI provider credential backing this model.
    #[serde(default)]
    pub provider_id: Option<i64>,

    /// Cached auto-trading flag (authoritative value is server-side).
    #[serde(default)]
    pub auto_trading: bool,
}

/// Request body for creating a new model.
#[derive(Debug, Clone, Serialize)]
pub struct NewModel {
    pub name: String,
    pub provider_id: Option<i64>,
}
