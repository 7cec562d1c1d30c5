//! Repository Pattern Abstractions
//!
//! Traits for ledger persistence, keeping business logic independent of
//! the storage backend. SQLite implementations live in
//! `infrastructure::persistence`; thread-safe in-memory implementations
//! in `infrastructure::repositories` cover tests and development.
//!
//! Every operation is scoped by `user_id`: a row belonging to another
//! user behaves exactly like a row that does not exist.

use crate::domain::ledger::{
    Budget, BudgetPeriod, Expense, ExpenseUpdate, Livestock, NewExpense, NewLivestock, NewRevenue,
    Revenue, RevenueUpdate, User,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository for registered users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user with an already-derived password digest
    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<User>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Repository for expense records
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn insert(&self, user_id: i64, new: &NewExpense) -> Result<Expense>;

    /// All expenses for a user, most recent date first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Expense>>;

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Expense>>;

    /// Apply a partial update; returns the updated row, or `None` if the
    /// user owns no such expense
    async fn update(&self, user_id: i64, id: i64, patch: &ExpenseUpdate)
    -> Result<Option<Expense>>;

    /// Returns whether a row was deleted
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool>;

    /// Sum of amounts with `start <= date < end`
    async fn total_in_range(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<f64>;
}

/// Repository for revenue records
#[async_trait]
pub trait RevenueRepository: Send + Sync {
    async fn insert(&self, user_id: i64, new: &NewRevenue) -> Result<Revenue>;

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Revenue>>;

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Revenue>>;

    async fn update(&self, user_id: i64, id: i64, patch: &RevenueUpdate)
    -> Result<Option<Revenue>>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool>;
}

/// Repository for herd records
#[async_trait]
pub trait LivestockRepository: Send + Sync {
    async fn insert(&self, user_id: i64, new: &NewLivestock) -> Result<Livestock>;

    /// All livestock for a user, newest entry first
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Livestock>>;
}

/// Repository for the per-user budget singleton
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Drop any existing budget rows for the user and insert the new one
    async fn replace_for_user(
        &self,
        user_id: i64,
        total_budget: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Budget>;

    /// The most recently created budget, if any
    async fn current_for_user(&self, user_id: i64) -> Result<Option<Budget>>;
}
