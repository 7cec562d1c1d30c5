//! Composition root: wires configuration, persistence, the model store,
//! and the services an embedding HTTP layer mounts.

use crate::application::analytics::AnalyticsService;
use crate::application::forecast::{ExpenseForecaster, ModelStore};
use crate::application::ledger_service::LedgerService;
use crate::config::Config;
use crate::infrastructure::persistence::{
    Database, SqliteBudgetRepository, SqliteExpenseRepository, SqliteLivestockRepository,
    SqliteRevenueRepository, SqliteUserRepository,
};
use crate::infrastructure::webhook::ExpenseIntakeWebhook;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct AppContext {
    pub db: Database,
    pub model_store: Arc<ModelStore>,
    pub forecaster: Arc<ExpenseForecaster>,
    pub ledger: Arc<LedgerService>,
    pub analytics: Arc<AnalyticsService>,
}

/// Build the full service graph. The model store loads before anything
/// accepts work, so every request observes one consistent loaded or
/// unavailable state.
pub async fn build(config: &Config) -> Result<AppContext> {
    let db = Database::new(&config.database_url).await?;

    let model_store = Arc::new(ModelStore::load(&config.model_dir));
    let forecaster = Arc::new(ExpenseForecaster::new(model_store.clone()));

    let users = Arc::new(SqliteUserRepository::new(db.pool.clone()));
    let expenses = Arc::new(SqliteExpenseRepository::new(db.pool.clone()));
    let revenues = Arc::new(SqliteRevenueRepository::new(db.pool.clone()));
    let livestock = Arc::new(SqliteLivestockRepository::new(db.pool.clone()));
    let budgets = Arc::new(SqliteBudgetRepository::new(db.pool.clone()));

    let webhook = config.expense_webhook_url.as_ref().map(|url| {
        info!("Expense intake webhook enabled: {}", url);
        Arc::new(ExpenseIntakeWebhook::new(url.clone()))
    });

    let ledger = Arc::new(LedgerService::new(
        users,
        expenses.clone(),
        revenues,
        livestock.clone(),
        budgets.clone(),
        webhook,
    ));
    let analytics = Arc::new(AnalyticsService::new(expenses, livestock, budgets));

    Ok(AppContext {
        db,
        model_store,
        forecaster,
        ledger,
        analytics,
    })
}
