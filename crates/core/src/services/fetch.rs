use tracing::warn;

use crate::client::api::ApiClient;
use crate::errors::CoreError;
use crate::models::chart::{parse_series, ChartSeriesPoint};
use crate::models::conversation::ConversationTurn;
use crate::models::model::ModelId;
use crate::models::portfolio::PortfolioSnapshot;
use crate::models::trade::Trade;

use super::aligner::{self, AlignedChart, NamedSeries};

/// Everything one refresh of a single-model view produces.
#[derive(Debug, Clone)]
pub struct ModelView {
    pub snapshot: PortfolioSnapshot,
    pub history: Vec<ChartSeriesPoint>,
    pub auto_trading: bool,
    pub trades: Vec<Trade>,
    pub conversations: Vec<ConversationTurn>,
}

/// Everything one refresh of the aggregated view produces.
#[derive(Debug, Clone)]
pub struct AggregatedView {
    pub snapshot: PortfolioSnapshot,
    pub chart: AlignedChart,
}

/// Log a secondary-read failure and substitute the neutral value.
/// Secondary reads never abort a refresh cycle.
fn degrade<T>(result: Result<Vec<T>, CoreError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(
                operation = e.operation().unwrap_or("secondary read"),
                cause = %e,
                "secondary read failed, degrading to empty"
            );
            Vec::new()
        }
    }
}

/// Fetch the portfolio/trades/conversations triple for one model.
///
/// All three reads run concurrently. The portfolio read is primary: its
/// failure (including an ok status with a missing snapshot) aborts the
/// refresh. Trades and conversations are secondary and degrade to empty
/// collections on failure.
pub async fn load_model_view(
    api: &ApiClient,
    model_id: ModelId,
    trade_limit: usize,
    conversation_limit: usize,
) -> Result<ModelView, CoreError> {
    let (portfolio, trades, conversations) = tokio::join!(
        api.model_portfolio(model_id),
        api.model_trades(model_id, trade_limit),
        api.model_conversations(model_id, conversation_limit),
    );

    let portfolio = portfolio?;
    let snapshot = portfolio.snapshot.ok_or(CoreError::MissingSnapshot {
        operation: "model portfolio".to_string(),
    })?;

    Ok(ModelView {
        snapshot,
        history: parse_series(&portfolio.history),
        auto_trading: portfolio.auto_trading,
        trades: degrade(trades),
        conversations: degrade(conversations),
    })
}

/// Fetch the combined snapshot plus one value-history series per model,
/// and align the series onto a common chart axis.
pub async fn load_aggregated_view(api: &ApiClient) -> Result<AggregatedView, CoreError> {
    let response = api.aggregated_portfolio().await?;

    let snapshot = response.snapshot.ok_or(CoreError::MissingSnapshot {
        operation: "aggregated portfolio".to_string(),
    })?;

    let series: Vec<NamedSeries> = response
        .series
        .iter()
        .map(|(name, raw)| NamedSeries {
            name: name.clone(),
            points: parse_series(raw),
        })
        .collect();

    Ok(AggregatedView {
        snapshot,
        chart: aligner::align(&series),
    })
}
