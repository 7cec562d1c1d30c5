//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementations of the ledger repository
//! traits, using `Arc<RwLock>` for concurrent access. Suitable for unit
//! tests and development; data is lost on restart. Username/email
//! uniqueness is enforced by the service pre-checks, not here.

use crate::domain::ledger::{
    Budget, BudgetPeriod, Expense, ExpenseUpdate, Livestock, NewExpense, NewLivestock, NewRevenue,
    Revenue, RevenueUpdate, User,
};
use crate::domain::repositories::{
    BudgetRepository, ExpenseRepository, LivestockRepository, RevenueRepository, UserRepository,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

fn next(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicI64::new(0),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: next(&self.next_id),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

pub struct InMemoryExpenseRepository {
    expenses: Arc<RwLock<Vec<Expense>>>,
    next_id: AtomicI64,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self {
            expenses: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicI64::new(0),
        }
    }
}

impl Default for InMemoryExpenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn insert(&self, user_id: i64, new: &NewExpense) -> Result<Expense> {
        let now = Utc::now();
        let expense = Expense {
            id: next(&self.next_id),
            amount: new.amount,
            category: new.category.clone(),
            description: new.description.clone().unwrap_or_default(),
            date: new.date,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.expenses.write().await.push(expense.clone());
        Ok(expense)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Expense>> {
        let mut items: Vec<Expense> = self
            .expenses
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        Ok(self
            .expenses
            .read()
            .await
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &ExpenseUpdate,
    ) -> Result<Option<Expense>> {
        let mut expenses = self.expenses.write().await;
        let Some(expense) = expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(amount) = patch.amount {
            expense.amount = amount;
        }
        if let Some(category) = &patch.category {
            expense.category = category.clone();
        }
        if let Some(description) = &patch.description {
            expense.description = description.clone();
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        expense.updated_at = Utc::now();

        Ok(Some(expense.clone()))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let mut expenses = self.expenses.write().await;
        let before = expenses.len();
        expenses.retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(expenses.len() < before)
    }

    async fn total_in_range(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<f64> {
        Ok(self
            .expenses
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id && e.date >= start && e.date < end)
            .map(|e| e.amount)
            .sum())
    }
}

pub struct InMemoryRevenueRepository {
    revenues: Arc<RwLock<Vec<Revenue>>>,
    next_id: AtomicI64,
}

impl InMemoryRevenueRepository {
    pub fn new() -> Self {
        Self {
            revenues: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicI64::new(0),
        }
    }
}

impl Default for InMemoryRevenueRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevenueRepository for InMemoryRevenueRepository {
    async fn insert(&self, user_id: i64, new: &NewRevenue) -> Result<Revenue> {
        let now = Utc::now();
        let revenue = Revenue {
            id: next(&self.next_id),
            amount: new.amount,
            source: new.source.clone(),
            description: new.description.clone().unwrap_or_default(),
            date: new.date,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.revenues.write().await.push(revenue.clone());
        Ok(revenue)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Revenue>> {
        let mut items: Vec<Revenue> = self
            .revenues
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Revenue>> {
        Ok(self
            .revenues
            .read()
            .await
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &RevenueUpdate,
    ) -> Result<Option<Revenue>> {
        let mut revenues = self.revenues.write().await;
        let Some(revenue) = revenues
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(amount) = patch.amount {
            revenue.amount = amount;
        }
        if let Some(source) = &patch.source {
            revenue.source = source.clone();
        }
        if let Some(description) = &patch.description {
            revenue.description = description.clone();
        }
        if let Some(date) = patch.date {
            revenue.date = date;
        }
        revenue.updated_at = Utc::now();

        Ok(Some(revenue.clone()))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let mut revenues = self.revenues.write().await;
        let before = revenues.len();
        revenues.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(revenues.len() < before)
    }
}

pub struct InMemoryLivestockRepository {
    livestock: Arc<RwLock<Vec<Livestock>>>,
    next_id: AtomicI64,
}

impl InMemoryLivestockRepository {
    pub fn new() -> Self {
        Self {
            livestock: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicI64::new(0),
        }
    }
}

impl Default for InMemoryLivestockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivestockRepository for InMemoryLivestockRepository {
    async fn insert(&self, user_id: i64, new: &NewLivestock) -> Result<Livestock> {
        let now = Utc::now();
        let item = Livestock {
            id: next(&self.next_id),
            kind: new.kind.clone(),
            breed: new.breed.clone(),
            quantity: new.quantity,
            age_months: new.age_months,
            weight_kg: new.weight_kg,
            purchase_date: new.purchase_date,
            purchase_price: new.purchase_price,
            notes: new.notes.clone(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.livestock.write().await.push(item.clone());
        Ok(item)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Livestock>> {
        // Newest entry first; insertion order stands in for created_at.
        Ok(self
            .livestock
            .read()
            .await
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub struct InMemoryBudgetRepository {
    budgets: Arc<RwLock<Vec<Budget>>>,
    next_id: AtomicI64,
}

impl InMemoryBudgetRepository {
    pub fn new() -> Self {
        Self {
            budgets: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicI64::new(0),
        }
    }
}

impl Default for InMemoryBudgetRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BudgetRepository for InMemoryBudgetRepository {
    async fn replace_for_user(
        &self,
        user_id: i64,
        total_budget: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Budget> {
        let now = Utc::now();
        let budget = Budget {
            id: next(&self.next_id),
            total_budget,
            remaining_budget: total_budget,
            period,
            start_date,
            end_date,
            user_id,
            created_at: now,
            updated_at: now,
        };

        let mut budgets = self.budgets.write().await;
        budgets.retain(|b| b.user_id != user_id);
        budgets.push(budget.clone());
        Ok(budget)
    }

    async fn current_for_user(&self, user_id: i64) -> Result<Option<Budget>> {
        Ok(self
            .budgets
            .read()
            .await
            .iter()
            .rev()
            .find(|b| b.user_id == user_id)
            .cloned())
    }
}
