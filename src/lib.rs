pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod metrics;
pub mod models;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;
use crate::ledger::{BalanceAdjuster, SessionQueue, SettlementEngine};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub metrics_handle: PrometheusHandle,
    pub settlement: SettlementEngine,
    pub session_queue: SessionQueue,
    pub balances: BalanceAdjuster,
}

impl AppState {
    /// Wire the ledger components onto one shared pool.
    pub fn new(db: sqlx::PgPool, config: AppConfig, metrics_handle: PrometheusHandle) -> Self {
        Self {
            settlement: SettlementEngine::new(db.clone(), &config),
            session_queue: SessionQueue::new(db.clone()),
            balances: BalanceAdjuster::new(db.clone(), config.balance_scale),
            db,
            config,
            metrics_handle,
        }
    }
}
