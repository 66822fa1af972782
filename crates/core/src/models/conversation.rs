use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One turn of the operator/system ↔ AI conversation log.
/// Immutable; delivered by the server in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,

    /// Prompt text. May be withheld by the server when the operator has
    /// disabled system-prompt visibility.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Raw AI response. Free-form; may itself be JSON-encoded.
    pub response: String,
}

impl ConversationTurn {
    /// Response text normalized for display.
    ///
    /// The model sometimes answers with a JSON-encoded string or object.
    /// A JSON string is unwrapped, a JSON object/array is pretty-printed,
    /// and anything else passes through untouched.
    pub fn normalized_response(&self) -> String {
        match serde_json::from_str::<serde_json::Value>(self.response.trim()) {
            Ok(serde_json::Value::String(inner)) => inner,
            Ok(value @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| self.response.clone())
            }
            _ => self.response.clone(),
        }
    }
}
