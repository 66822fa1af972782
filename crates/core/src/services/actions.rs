use tracing::warn;

use crate::client::api::ApiClient;
use crate::errors::CoreError;
use crate::models::view::ViewMode;

use super::fetch;
use super::view_state::ViewController;

/// Operator-facing result of a control action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was sent and confirmed by the server.
    Applied { message: String },
    /// The action was a deliberate no-op; no network call was made.
    Refused { message: String },
}

impl ActionOutcome {
    fn applied(message: impl Into<String>) -> Self {
        ActionOutcome::Applied {
            message: message.into(),
        }
    }

    fn refused(message: impl Into<String>) -> Self {
        ActionOutcome::Refused {
            message: message.into(),
        }
    }
}

/// Trigger one trading cycle for the selected model.
///
/// Only valid in single-model mode. On any failure local state is left
/// unchanged and the error is surfaced to the operator; the action is never
/// retried by this layer. On success the auto-trading flag is re-derived
/// from the portfolio read that follows — the execute response itself never
/// sets it (the server may re-enable auto-trading as a side effect).
pub async fn execute_trading_cycle(
    api: &ApiClient,
    controller: &mut ViewController,
    trade_limit: usize,
    conversation_limit: usize,
) -> Result<ActionOutcome, CoreError> {
    let Some(model_id) = controller.state().selected_model() else {
        return Err(CoreError::InvalidAction(
            "trading cycle can only be executed with a single model selected".to_string(),
        ));
    };

    api.execute_trading_cycle(model_id).await?;

    // Follow-up read re-derives the authoritative flag and refreshes the
    // view. Its failure does not undo the execute; the next timer-driven
    // refresh will reconcile.
    let ticket = controller.current_ticket();
    match fetch::load_model_view(api, model_id, trade_limit, conversation_limit).await {
        Ok(view) => {
            controller.apply_model_view(ticket, view);
        }
        Err(e) => {
            warn!(model_id, cause = %e, "post-execute refresh failed");
        }
    }

    Ok(ActionOutcome::applied("Trading cycle executed"))
}

/// Pause auto-trading for the selected model.
///
/// Valid only in single-model mode and only while the cached flag is true;
/// otherwise a no-op with feedback and no network call. The local flag is
/// flipped strictly after the server confirms the disable — never
/// optimistically.
pub async fn pause_auto_trading(
    api: &ApiClient,
    controller: &mut ViewController,
) -> Result<ActionOutcome, CoreError> {
    if controller.state().mode() == ViewMode::Aggregated {
        return Err(CoreError::InvalidAction(
            "auto-trading can only be paused with a single model selected".to_string(),
        ));
    }
    let Some(model_id) = controller.state().selected_model() else {
        return Err(CoreError::InvalidAction(
            "no model selected".to_string(),
        ));
    };

    if !controller.state().auto_trading_enabled() {
        return Ok(ActionOutcome::refused("Auto-trading is already paused"));
    }

    api.set_auto_trading(model_id, false).await?;
    controller.confirm_auto_trading(false);

    Ok(ActionOutcome::applied("Auto-trading paused"))
}
