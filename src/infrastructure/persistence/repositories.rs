//! SQLite implementations of the ledger repository traits.
//!
//! Dates are stored as ISO-8601 TEXT, timestamps as RFC3339 TEXT; both
//! round-trip through the chrono column types. Ids come from SQLite's
//! rowid allocator via `last_insert_rowid`.

use crate::domain::ledger::{
    Budget, BudgetPeriod, Expense, ExpenseUpdate, Livestock, NewExpense, NewLivestock, NewRevenue,
    Revenue, RevenueUpdate, User,
};
use crate::domain::repositories::{
    BudgetRepository, ExpenseRepository, LivestockRepository, RevenueRepository, UserRepository,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::str::FromStr;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }
}

pub struct SqliteExpenseRepository {
    pool: SqlitePool,
}

impl SqliteExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_expense(row: &SqliteRow) -> Result<Expense> {
    Ok(Expense {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ExpenseRepository for SqliteExpenseRepository {
    async fn insert(&self, user_id: i64, new: &NewExpense) -> Result<Expense> {
        let now = Utc::now();
        let description = new.description.clone().unwrap_or_default();
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (amount, category, description, date, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.amount)
        .bind(&new.category)
        .bind(&description)
        .bind(new.date)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert expense")?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            amount: new.amount,
            category: new.category.clone(),
            description,
            date: new.date,
            user_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Expense>> {
        let rows = sqlx::query("SELECT * FROM expenses WHERE user_id = ? ORDER BY date DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_expense).collect()
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        let row = sqlx::query("SELECT * FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_expense).transpose()
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &ExpenseUpdate,
    ) -> Result<Option<Expense>> {
        let Some(existing) = self.find(user_id, id).await? else {
            return Ok(None);
        };

        let updated = Expense {
            amount: patch.amount.unwrap_or(existing.amount),
            category: patch.category.clone().unwrap_or(existing.category),
            description: patch.description.clone().unwrap_or(existing.description),
            date: patch.date.unwrap_or(existing.date),
            updated_at: Utc::now(),
            ..existing
        };

        sqlx::query(
            r#"
            UPDATE expenses
            SET amount = ?, category = ?, description = ?, date = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(updated.amount)
        .bind(&updated.category)
        .bind(&updated.description)
        .bind(updated.date)
        .bind(updated.updated_at)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update expense")?;

        Ok(Some(updated))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;
        Ok(result.rows_affected() > 0)
    }

    async fn total_in_range(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<f64> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0.0) as total
            FROM expenses
            WHERE user_id = ? AND date >= ? AND date < ?
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }
}

pub struct SqliteRevenueRepository {
    pool: SqlitePool,
}

impl SqliteRevenueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_revenue(row: &SqliteRow) -> Result<Revenue> {
    Ok(Revenue {
        id: row.try_get("id")?,
        amount: row.try_get("amount")?,
        source: row.try_get("source")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl RevenueRepository for SqliteRevenueRepository {
    async fn insert(&self, user_id: i64, new: &NewRevenue) -> Result<Revenue> {
        let now = Utc::now();
        let description = new.description.clone().unwrap_or_default();
        let result = sqlx::query(
            r#"
            INSERT INTO revenues (amount, source, description, date, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.amount)
        .bind(&new.source)
        .bind(&description)
        .bind(new.date)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert revenue")?;

        Ok(Revenue {
            id: result.last_insert_rowid(),
            amount: new.amount,
            source: new.source.clone(),
            description,
            date: new.date,
            user_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Revenue>> {
        let rows = sqlx::query("SELECT * FROM revenues WHERE user_id = ? ORDER BY date DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map_revenue).collect()
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Revenue>> {
        let row = sqlx::query("SELECT * FROM revenues WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_revenue).transpose()
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        patch: &RevenueUpdate,
    ) -> Result<Option<Revenue>> {
        let Some(existing) = self.find(user_id, id).await? else {
            return Ok(None);
        };

        let updated = Revenue {
            amount: patch.amount.unwrap_or(existing.amount),
            source: patch.source.clone().unwrap_or(existing.source),
            description: patch.description.clone().unwrap_or(existing.description),
            date: patch.date.unwrap_or(existing.date),
            updated_at: Utc::now(),
            ..existing
        };

        sqlx::query(
            r#"
            UPDATE revenues
            SET amount = ?, source = ?, description = ?, date = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(updated.amount)
        .bind(&updated.source)
        .bind(&updated.description)
        .bind(updated.date)
        .bind(updated.updated_at)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update revenue")?;

        Ok(Some(updated))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM revenues WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete revenue")?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct SqliteLivestockRepository {
    pool: SqlitePool,
}

impl SqliteLivestockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_livestock(row: &SqliteRow) -> Result<Livestock> {
    Ok(Livestock {
        id: row.try_get("id")?,
        kind: row.try_get("type")?,
        breed: row.try_get("breed")?,
        quantity: row.try_get("quantity")?,
        age_months: row.try_get("age_months")?,
        weight_kg: row.try_get("weight_kg")?,
        purchase_date: row.try_get("purchase_date")?,
        purchase_price: row.try_get("purchase_price")?,
        notes: row.try_get("notes")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl LivestockRepository for SqliteLivestockRepository {
    async fn insert(&self, user_id: i64, new: &NewLivestock) -> Result<Livestock> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO livestock
                (type, breed, quantity, age_months, weight_kg, purchase_date,
                 purchase_price, notes, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.kind)
        .bind(&new.breed)
        .bind(new.quantity)
        .bind(new.age_months)
        .bind(new.weight_kg)
        .bind(new.purchase_date)
        .bind(new.purchase_price)
        .bind(&new.notes)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert livestock")?;

        Ok(Livestock {
            id: result.last_insert_rowid(),
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
        })
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Livestock>> {
        let rows =
            sqlx::query("SELECT * FROM livestock WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(map_livestock).collect()
    }
}

pub struct SqliteBudgetRepository {
    pool: SqlitePool,
}

impl SqliteBudgetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_budget(row: &SqliteRow) -> Result<Budget> {
    let period_str: String = row.try_get("period")?;
    Ok(Budget {
        id: row.try_get("id")?,
        total_budget: row.try_get("total_budget")?,
        remaining_budget: row.try_get("remaining_budget")?,
        period: BudgetPeriod::from_str(&period_str)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl BudgetRepository for SqliteBudgetRepository {
    async fn replace_for_user(
        &self,
        user_id: i64,
        total_budget: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Budget> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM budgets WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear previous budget")?;

        let result = sqlx::query(
            r#"
            INSERT INTO budgets
                (total_budget, remaining_budget, period, start_date, end_date,
                 user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(total_budget)
        .bind(total_budget)
        .bind(period.to_string())
        .bind(start_date)
        .bind(end_date)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to insert budget")?;

        tx.commit().await?;

        Ok(Budget {
            id: result.last_insert_rowid(),
            total_budget,
            remaining_budget: total_budget,
            period,
            start_date,
            end_date,
            user_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn current_for_user(&self, user_id: i64) -> Result<Option<Budget>> {
        let row = sqlx::query(
            "SELECT * FROM budgets WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_budget).transpose()
    }
}
