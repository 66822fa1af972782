// ═══════════════════════════════════════════════════════════════════
// Service & Integration Tests — ViewController, fetch orchestration,
// control actions, Dashboard facade (mock transport)
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use dashboard_core::client::transport::{HttpMethod, Transport, TransportResponse};
use dashboard_core::config::DashboardConfig;
use dashboard_core::errors::CoreError;
use dashboard_core::models::model::Model;
use dashboard_core::models::portfolio::PortfolioSnapshot;
use dashboard_core::models::view::ViewMode;
use dashboard_core::services::actions::ActionOutcome;
use dashboard_core::services::fetch::ModelView;
use dashboard_core::services::view_state::ViewController;
use dashboard_core::Dashboard;

// ═══════════════════════════════════════════════════════════════════
// Mock Transport
// ═══════════════════════════════════════════════════════════════════

#[derive(Clone)]
enum Canned {
    Reply { status: u16, body: String },
    NetworkDown,
}

/// Scripted transport: responses are keyed by "METHOD path". A key with
/// multiple entries plays them in order and repeats the last one; every
/// request is recorded so tests can assert which calls were (not) made.
struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn route(&self, key: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Canned::Reply {
                status,
                body: body.to_string(),
            });
    }

    fn route_down(&self, key: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Canned::NetworkDown);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == key).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        _body: Option<serde_json::Value>,
    ) -> Result<TransportResponse, CoreError> {
        let key = format!("{method} {path}");
        self.calls.lock().unwrap().push(key.clone());

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no mock route for {key}"));
        let canned = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };

        match canned {
            Canned::Reply { status, body } => Ok(TransportResponse { status, body }),
            Canned::NetworkDown => Err(CoreError::Network {
                operation: path.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

const MODELS: &str = r#"[
    {"id":1,"name":"alpha","auto_trading":true},
    {"id":2,"name":"beta","auto_trading":false}
]"#;

const MODEL1_PORTFOLIO: &str = r#"{
    "snapshot": {
        "total_value": 10500.0, "cash": 2500.0,
        "realized_pnl": 300.0, "unrealized_pnl": -120.0,
        "positions": [
            {"coin":"BTC","side":"long","quantity":0.5,"entry_price":60000.0,
             "current_price":61000.0,"leverage":2.0,"unrealized_pnl":500.0}
        ]
    },
    "history": [
        {"timestamp":"2025-03-01T10:00:00Z","value":10000.0},
        {"timestamp":"2025-03-01T11:00:00Z","value":10500.0}
    ],
    "auto_trading": true
}"#;

const MODEL2_PORTFOLIO: &str = r#"{
    "snapshot": {"total_value": 5000.0, "cash": 5000.0, "positions": []},
    "history": [{"timestamp":"2025-03-01T10:00:00Z","value":5000.0}],
    "auto_trading": false
}"#;

const MODEL2_PORTFOLIO_REENABLED: &str = r#"{
    "snapshot": {"total_value": 5100.0, "cash": 4000.0, "positions": []},
    "history": [{"timestamp":"2025-03-01T12:00:00Z","value":5100.0}],
    "auto_trading": true
}"#;

const TRADES: &str = r#"[
    {"timestamp":"2025-03-01T10:00:00Z","coin":"BTC","signal":"buy_to_enter",
     "quantity":0.5,"price":60000.0,"realized_pnl":12.5,"fee":30.0}
]"#;

const CONVERSATIONS: &str = r#"[
    {"timestamp":"2025-03-01T10:00:00Z","prompt":"decide","response":"\"hold\""}
]"#;

const AGGREGATED: &str = r#"{
    "snapshot": {"total_value": 15500.0, "cash": 7500.0, "positions": []},
    "series": {
        "alpha": [{"timestamp":"2025-03-01T10:00:00Z","value":10000.0}],
        "beta":  [{"timestamp":"2025-03-01T11:00:00Z","value":5000.0}]
    }
}"#;

fn dashboard(mock: Arc<MockTransport>) -> Dashboard {
    Dashboard::with_transport(mock, DashboardConfig::with_base_url("http://test"))
}

fn route_model1(mock: &MockTransport) {
    mock.route("GET /api/models/1/portfolio", 200, MODEL1_PORTFOLIO);
    mock.route("GET /api/models/1/trades?limit=50", 200, TRADES);
    mock.route("GET /api/models/1/conversations?limit=20", 200, CONVERSATIONS);
}

fn route_model2(mock: &MockTransport) {
    mock.route("GET /api/models/2/portfolio", 200, MODEL2_PORTFOLIO);
    mock.route("GET /api/models/2/trades?limit=50", 200, "[]");
    mock.route("GET /api/models/2/conversations?limit=20", 200, "[]");
}

// ═══════════════════════════════════════════════════════════════════
// Facade: startup & view selection
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn init_loads_models_and_aggregated_view() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();

    assert_eq!(dash.models().len(), 2);
    let plan = dash.render_plan();
    assert_eq!(plan.mode, ViewMode::Aggregated);
    assert_eq!(plan.title, "All Models");
    assert!(!plan.show_detail_tabs);
    assert_eq!(plan.total_value, Some(15500.0));
    assert!(!plan.chart_empty);
}

#[tokio::test]
async fn select_model_loads_detail_and_derives_auto_trading_flag() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model1(&mock);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    assert_eq!(dash.view_state().selected_model(), Some(1));
    assert!(dash.view_state().auto_trading_enabled());

    let plan = dash.render_plan();
    assert_eq!(plan.mode, ViewMode::SingleModel);
    assert_eq!(plan.title, "alpha");
    assert!(plan.show_detail_tabs);
    assert_eq!(plan.auto_trading_label, "Running");
    assert_eq!(plan.total_value, Some(10500.0));
    assert_eq!(plan.positions.len(), 1);
    assert_eq!(plan.trades.len(), 1);
    assert_eq!(plan.trades[0].signal_label, "OPEN LONG");
}

#[tokio::test]
async fn select_unknown_model_is_rejected_without_state_change() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();

    let err = dash.select_model(99).await.unwrap_err();
    assert!(matches!(err, CoreError::UnknownModel(99)));
    assert_eq!(dash.view_state().mode(), ViewMode::Aggregated);
    assert!(dash.view_state().selected_model().is_none());
}

// ═══════════════════════════════════════════════════════════════════
// Failure isolation: primary vs secondary reads
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn secondary_read_failure_degrades_to_empty_but_view_updates() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    mock.route("GET /api/models/1/portfolio", 200, MODEL1_PORTFOLIO);
    mock.route("GET /api/models/1/trades?limit=50", 500, "oops");
    mock.route("GET /api/models/1/conversations?limit=20", 200, CONVERSATIONS);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    // Portfolio values updated, trades degraded to empty, conversations kept.
    let plan = dash.render_plan();
    assert_eq!(plan.total_value, Some(10500.0));
    assert!(plan.trades.is_empty());
    assert_eq!(dash.controller().conversations().len(), 1);
}

#[tokio::test]
async fn primary_read_failure_preserves_previously_rendered_values() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    // First portfolio read succeeds, the second breaks.
    mock.route("GET /api/models/1/portfolio", 200, MODEL1_PORTFOLIO);
    mock.route("GET /api/models/1/portfolio", 500, "boom");
    mock.route("GET /api/models/1/trades?limit=50", 200, TRADES);
    mock.route("GET /api/models/1/conversations?limit=20", 200, CONVERSATIONS);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    let err = dash.refresh_current_view().await.unwrap_err();
    assert!(matches!(err, CoreError::HttpStatus { status: 500, .. }));

    // Previous good state remains displayed, never cleared or corrupted.
    let plan = dash.render_plan();
    assert_eq!(plan.total_value, Some(10500.0));
    assert_eq!(plan.trades.len(), 1);
}

#[tokio::test]
async fn ok_status_with_missing_snapshot_is_a_load_failure() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    mock.route("GET /api/models/1/portfolio", 200, r#"{"history":[]}"#);
    mock.route("GET /api/models/1/trades?limit=50", 200, "[]");
    mock.route("GET /api/models/1/conversations?limit=20", 200, "[]");

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();

    let err = dash.select_model(1).await.unwrap_err();
    assert!(matches!(err, CoreError::MissingSnapshot { .. }));
    // The aggregate numbers from before the switch are still shown.
    assert_eq!(dash.render_plan().total_value, Some(15500.0));
}

#[tokio::test]
async fn business_error_body_fails_the_operation() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, r#"{"error":"database locked"}"#);

    let mut dash = dashboard(mock.clone());
    let err = dash.refresh_models().await.unwrap_err();
    match err {
        CoreError::Api { operation, message } => {
            assert_eq!(operation, "list models");
            assert_eq!(message, "database locked");
        }
        other => panic!("expected business error, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Stale-response discard (response interleaving)
// ═══════════════════════════════════════════════════════════════════

fn model_view(total_value: f64) -> ModelView {
    ModelView {
        snapshot: PortfolioSnapshot {
            total_value,
            cash: total_value,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            positions: Vec::new(),
        },
        history: Vec::new(),
        auto_trading: true,
        trades: Vec::new(),
        conversations: Vec::new(),
    }
}

fn controller_with_models() -> ViewController {
    let mut controller = ViewController::new();
    controller.set_models(vec![
        Model {
            id: 5,
            name: "gamma".to_string(),
            provider_id: None,
            auto_trading: false,
        },
        Model {
            id: 6,
            name: "delta".to_string(),
            provider_id: None,
            auto_trading: false,
        },
    ]);
    controller
}

#[test]
fn stale_model_response_does_not_overwrite_aggregated_view() {
    let mut controller = controller_with_models();

    // User selects model 5; its fetch is in flight...
    let ticket = controller.select_model(5).unwrap();
    // ...and switches back to aggregated before the response lands.
    controller.select_aggregated_view();

    // The slow model-5 response arrives: it must be discarded.
    assert!(!controller.apply_model_view(ticket, model_view(9999.0)));
    assert_eq!(controller.state().mode(), ViewMode::Aggregated);
    assert!(controller.snapshot().is_none());
    assert!(!controller.state().auto_trading_enabled());
}

#[test]
fn stale_response_for_previous_model_does_not_leak_into_next_model() {
    let mut controller = controller_with_models();

    let old_ticket = controller.select_model(5).unwrap();
    controller.select_model(6).unwrap();

    assert!(!controller.apply_model_view(old_ticket, model_view(9999.0)));
    assert!(controller.snapshot().is_none());
    assert_eq!(controller.state().selected_model(), Some(6));
}

#[test]
fn timer_refresh_ticket_applies_while_view_is_unchanged() {
    let mut controller = controller_with_models();
    controller.select_model(5).unwrap();

    // A scheduler-driven refresh reuses the current identity: no bump.
    let ticket = controller.current_ticket();
    assert!(controller.apply_model_view(ticket, model_view(123.0)));
    assert_eq!(controller.snapshot().unwrap().total_value, 123.0);
    assert!(controller.state().auto_trading_enabled());
}

// ═══════════════════════════════════════════════════════════════════
// Model deletion
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn deleting_selected_model_forces_aggregated_view_and_reload() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model1(&mock);
    mock.route("DELETE /api/models/1", 200, "");

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    dash.delete_model(1).await.unwrap();

    assert_eq!(dash.view_state().mode(), ViewMode::Aggregated);
    assert!(dash.view_state().selected_model().is_none());
    assert_eq!(dash.render_plan().total_value, Some(15500.0));
    // Aggregate was reloaded: once at init, once after the delete.
    assert_eq!(mock.call_count("GET /api/portfolio"), 2);
}

#[tokio::test]
async fn deleting_unselected_model_only_refreshes_the_list() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model1(&mock);
    mock.route("DELETE /api/models/2", 200, "");

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    dash.delete_model(2).await.unwrap();

    // Selection survives; the model-1 view was not reloaded.
    assert_eq!(dash.view_state().selected_model(), Some(1));
    assert_eq!(mock.call_count("GET /api/models/1/portfolio"), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Control actions
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn pause_with_flag_already_false_makes_no_network_call() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model2(&mock);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(2).await.unwrap();
    assert!(!dash.view_state().auto_trading_enabled());

    let outcome = dash.pause_auto_trading().await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Refused { .. }));
    assert!(!mock
        .calls()
        .iter()
        .any(|c| c.contains("auto-trading")));
}

#[tokio::test]
async fn pause_flips_flag_only_after_server_confirmation() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model1(&mock);
    mock.route("POST /api/models/1/auto-trading", 200, r#"{"success":true}"#);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();
    assert!(dash.view_state().auto_trading_enabled());

    let outcome = dash.pause_auto_trading().await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Applied { .. }));
    assert!(!dash.view_state().auto_trading_enabled());
    assert_eq!(dash.render_plan().auto_trading_label, "Paused");
}

#[tokio::test]
async fn pause_failure_leaves_flag_untouched() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model1(&mock);
    mock.route("POST /api/models/1/auto-trading", 500, "boom");

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    let err = dash.pause_auto_trading().await.unwrap_err();
    assert!(matches!(err, CoreError::HttpStatus { status: 500, .. }));
    // Never flipped optimistically.
    assert!(dash.view_state().auto_trading_enabled());
}

#[tokio::test]
async fn execute_is_rejected_in_aggregated_mode() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();

    let err = dash.execute_trading_cycle().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidAction(_)));
    assert!(!mock.calls().iter().any(|c| c.contains("/execute")));
}

#[tokio::test]
async fn execute_rederives_auto_trading_flag_from_follow_up_read() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    // First read: paused. Post-execute read: the server re-enabled it.
    mock.route("GET /api/models/2/portfolio", 200, MODEL2_PORTFOLIO);
    mock.route("GET /api/models/2/portfolio", 200, MODEL2_PORTFOLIO_REENABLED);
    mock.route("GET /api/models/2/trades?limit=50", 200, "[]");
    mock.route("GET /api/models/2/conversations?limit=20", 200, "[]");
    mock.route("POST /api/models/2/execute", 200, r#"{"status":"ok"}"#);

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(2).await.unwrap();
    assert!(!dash.view_state().auto_trading_enabled());

    let outcome = dash.execute_trading_cycle().await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Applied { .. }));
    // The flag came from the fresh portfolio read, not the execute response.
    assert!(dash.view_state().auto_trading_enabled());
    assert_eq!(dash.render_plan().total_value, Some(5100.0));
}

#[tokio::test]
async fn execute_failure_changes_nothing_and_is_not_retried() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model2(&mock);
    mock.route_down("POST /api/models/2/execute");

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(2).await.unwrap();

    let err = dash.execute_trading_cycle().await.unwrap_err();
    assert!(matches!(err, CoreError::Network { .. }));
    assert_eq!(mock.call_count("POST /api/models/2/execute"), 1);
    assert_eq!(dash.render_plan().total_value, Some(5000.0));
}

// ═══════════════════════════════════════════════════════════════════
// Market prices
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn market_refresh_reconciles_open_position_mark_prices() {
    let mock = MockTransport::new();
    mock.route("GET /api/models", 200, MODELS);
    mock.route("GET /api/portfolio", 200, AGGREGATED);
    route_model1(&mock);
    mock.route(
        "GET /api/market/prices",
        200,
        r#"{"BTC":{"price":62000.0,"change_24h":1.8,"name":"Bitcoin"}}"#,
    );

    let mut dash = dashboard(mock.clone());
    dash.init().await.unwrap();
    dash.select_model(1).await.unwrap();

    dash.refresh_market_prices().await.unwrap();

    assert_eq!(dash.market()["BTC"].price, 62000.0);
    let plan = dash.render_plan();
    assert_eq!(plan.positions[0].current_price, "62000.00");
}
