//! Dashboard aggregates: current-month spend, herd valuation, budget.

use crate::domain::errors::LedgerError;
use crate::domain::ledger::AnalyticsSummary;
use crate::domain::repositories::{BudgetRepository, ExpenseRepository, LivestockRepository};
use chrono::{Datelike, Months, NaiveDate};
use std::sync::Arc;

pub struct AnalyticsService {
    expenses: Arc<dyn ExpenseRepository>,
    livestock: Arc<dyn LivestockRepository>,
    budgets: Arc<dyn BudgetRepository>,
}

impl AnalyticsService {
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        livestock: Arc<dyn LivestockRepository>,
        budgets: Arc<dyn BudgetRepository>,
    ) -> Self {
        Self {
            expenses,
            livestock,
            budgets,
        }
    }

    /// Summary for the calendar month containing `today`.
    pub async fn monthly_summary(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<AnalyticsSummary, LedgerError> {
        let (start, end) = month_window(today);
        let total_expenses_month = self.expenses.total_in_range(user_id, start, end).await?;

        let herd = self.livestock.list_for_user(user_id).await?;
        let total_livestock_value = herd
            .iter()
            .map(|item| item.purchase_price.unwrap_or(0.0) * item.quantity as f64)
            .sum();
        let livestock_count = herd.iter().map(|item| item.quantity).sum();

        let budget = self.budgets.current_for_user(user_id).await?;

        Ok(AnalyticsSummary {
            total_expenses_month,
            total_livestock_value,
            livestock_count,
            budget,
        })
    }
}

/// Half-open window [first of month, first of next month).
fn month_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
    (start, start + Months::new(1))
}
