//! CRUD orchestration over the ledger repositories.
//!
//! Every operation is scoped to one user. Expense creation additionally
//! forwards the record to the intake webhook when one is configured; the
//! write commits regardless of delivery outcome.

use crate::domain::errors::LedgerError;
use crate::domain::ledger::{
    Budget, BudgetPeriod, Expense, ExpenseUpdate, Livestock, NewBudget, NewExpense, NewLivestock,
    NewRevenue, NewUser, Revenue, RevenueUpdate, User, password,
};
use crate::domain::repositories::{
    BudgetRepository, ExpenseRepository, LivestockRepository, RevenueRepository, UserRepository,
};
use crate::infrastructure::webhook::ExpenseIntakeWebhook;
use chrono::{Months, NaiveDate};
use std::sync::Arc;

pub struct LedgerService {
    users: Arc<dyn UserRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    revenues: Arc<dyn RevenueRepository>,
    livestock: Arc<dyn LivestockRepository>,
    budgets: Arc<dyn BudgetRepository>,
    expense_webhook: Option<Arc<ExpenseIntakeWebhook>>,
}

impl LedgerService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        revenues: Arc<dyn RevenueRepository>,
        livestock: Arc<dyn LivestockRepository>,
        budgets: Arc<dyn BudgetRepository>,
        expense_webhook: Option<Arc<ExpenseIntakeWebhook>>,
    ) -> Self {
        Self {
            users,
            expenses,
            revenues,
            livestock,
            budgets,
            expense_webhook,
        }
    }

    // -- Users --------------------------------------------------------

    pub async fn register_user(&self, new: &NewUser) -> Result<User, LedgerError> {
        if self.users.find_by_username(&new.username).await?.is_some() {
            return Err(LedgerError::Conflict("Username already exists".to_string()));
        }
        if self.users.find_by_email(&new.email).await?.is_some() {
            return Err(LedgerError::Conflict("Email already exists".to_string()));
        }

        let digest = password::hash_password(&new.password);
        let user = self.users.insert(&new.username, &new.email, &digest).await?;
        Ok(user)
    }

    /// Check credentials without revealing whether the username or the
    /// password was wrong.
    pub async fn verify_credentials(
        &self,
        username: &str,
        supplied_password: &str,
    ) -> Result<Option<User>, LedgerError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };
        if password::verify_password(supplied_password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn user_by_id(&self, id: i64) -> Result<User, LedgerError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("User"))
    }

    // -- Expenses -----------------------------------------------------

    pub async fn create_expense(
        &self,
        user_id: i64,
        new: &NewExpense,
    ) -> Result<Expense, LedgerError> {
        let expense = self.expenses.insert(user_id, new).await?;

        if let Some(webhook) = &self.expense_webhook {
            let webhook = webhook.clone();
            let record = expense.clone();
            tokio::spawn(async move {
                webhook.notify_expense(user_id, &record).await;
            });
        }

        Ok(expense)
    }

    pub async fn expenses_for(&self, user_id: i64) -> Result<Vec<Expense>, LedgerError> {
        Ok(self.expenses.list_for_user(user_id).await?)
    }

    pub async fn update_expense(
        &self,
        user_id: i64,
        id: i64,
        patch: &ExpenseUpdate,
    ) -> Result<Expense, LedgerError> {
        self.expenses
            .update(user_id, id, patch)
            .await?
            .ok_or_else(|| LedgerError::not_found("Expense"))
    }

    pub async fn delete_expense(&self, user_id: i64, id: i64) -> Result<(), LedgerError> {
        if self.expenses.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(LedgerError::not_found("Expense"))
        }
    }

    // -- Revenues -----------------------------------------------------

    pub async fn create_revenue(
        &self,
        user_id: i64,
        new: &NewRevenue,
    ) -> Result<Revenue, LedgerError> {
        Ok(self.revenues.insert(user_id, new).await?)
    }

    pub async fn revenues_for(&self, user_id: i64) -> Result<Vec<Revenue>, LedgerError> {
        Ok(self.revenues.list_for_user(user_id).await?)
    }

    pub async fn update_revenue(
        &self,
        user_id: i64,
        id: i64,
        patch: &RevenueUpdate,
    ) -> Result<Revenue, LedgerError> {
        self.revenues
            .update(user_id, id, patch)
            .await?
            .ok_or_else(|| LedgerError::not_found("Revenue"))
    }

    pub async fn delete_revenue(&self, user_id: i64, id: i64) -> Result<(), LedgerError> {
        if self.revenues.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(LedgerError::not_found("Revenue"))
        }
    }

    // -- Livestock ----------------------------------------------------

    pub async fn add_livestock(
        &self,
        user_id: i64,
        new: &NewLivestock,
    ) -> Result<Livestock, LedgerError> {
        Ok(self.livestock.insert(user_id, new).await?)
    }

    pub async fn livestock_for(&self, user_id: i64) -> Result<Vec<Livestock>, LedgerError> {
        Ok(self.livestock.list_for_user(user_id).await?)
    }

    // -- Budget -------------------------------------------------------

    /// Replace the user's budget. The period runs from `today` to one
    /// calendar month or year later, clamped to the last valid day of the
    /// target month.
    pub async fn set_budget(
        &self,
        user_id: i64,
        new: &NewBudget,
        today: NaiveDate,
    ) -> Result<Budget, LedgerError> {
        if !new.total_budget.is_finite() {
            return Err(LedgerError::InvalidInput {
                field: "total_budget",
                reason: "must be a finite number".to_string(),
            });
        }

        let end_date = period_end(today, new.period);
        let budget = self
            .budgets
            .replace_for_user(user_id, new.total_budget, new.period, today, end_date)
            .await?;
        Ok(budget)
    }

    pub async fn current_budget(&self, user_id: i64) -> Result<Option<Budget>, LedgerError> {
        Ok(self.budgets.current_for_user(user_id).await?)
    }
}

fn period_end(start: NaiveDate, period: BudgetPeriod) -> NaiveDate {
    let months = match period {
        BudgetPeriod::Monthly => 1,
        BudgetPeriod::Yearly => 12,
    };
    start + Months::new(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::{
        InMemoryBudgetRepository, InMemoryExpenseRepository, InMemoryLivestockRepository,
        InMemoryRevenueRepository, InMemoryUserRepository,
    };

    fn service() -> LedgerService {
        LedgerService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryExpenseRepository::new()),
            Arc::new(InMemoryRevenueRepository::new()),
            Arc::new(InMemoryLivestockRepository::new()),
            Arc::new(InMemoryBudgetRepository::new()),
            None,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_period_clamps_to_month_end() {
        assert_eq!(
            period_end(date(2024, 1, 31), BudgetPeriod::Monthly),
            date(2024, 2, 29)
        );
        assert_eq!(
            period_end(date(2023, 1, 31), BudgetPeriod::Monthly),
            date(2023, 2, 28)
        );
        assert_eq!(
            period_end(date(2024, 12, 15), BudgetPeriod::Monthly),
            date(2025, 1, 15)
        );
    }

    #[test]
    fn yearly_period_spans_a_year() {
        assert_eq!(
            period_end(date(2024, 3, 10), BudgetPeriod::Yearly),
            date(2025, 3, 10)
        );
        // Feb 29 in a leap year lands on Feb 28 the next year.
        assert_eq!(
            period_end(date(2024, 2, 29), BudgetPeriod::Yearly),
            date(2025, 2, 28)
        );
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let service = service();
        let new = NewUser {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
        };
        service.register_user(&new).await.unwrap();

        let again = NewUser {
            email: "other@example.com".to_string(),
            ..new.clone()
        };
        let err = service.register_user(&again).await.unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");

        let same_email = NewUser {
            username: "grace".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
        };
        let err = service.register_user(&same_email).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn credentials_verify_against_stored_digest() {
        let service = service();
        let user = service
            .register_user(&NewUser {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        let found = service
            .verify_credentials("ada", "correct horse")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(
            service
                .verify_credentials("ada", "wrong")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            service
                .verify_credentials("nobody", "correct horse")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn deleting_someone_elses_expense_reports_not_found() {
        let service = service();
        let expense = service
            .create_expense(
                1,
                &NewExpense {
                    amount: 45.0,
                    category: "feed".to_string(),
                    description: None,
                    date: date(2024, 5, 1),
                },
            )
            .await
            .unwrap();

        let err = service.delete_expense(2, expense.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "Expense" }));

        service.delete_expense(1, expense.id).await.unwrap();
        assert!(service.expenses_for(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_finite_budget_is_rejected() {
        let service = service();
        let err = service
            .set_budget(
                1,
                &NewBudget {
                    total_budget: f64::NAN,
                    period: BudgetPeriod::Monthly,
                },
                date(2024, 1, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput { field: "total_budget", .. }));
    }

    #[tokio::test]
    async fn setting_budget_replaces_the_previous_one() {
        let service = service();
        service
            .set_budget(
                7,
                &NewBudget {
                    total_budget: 1000.0,
                    period: BudgetPeriod::Monthly,
                },
                date(2024, 1, 15),
            )
            .await
            .unwrap();

        let replaced = service
            .set_budget(
                7,
                &NewBudget {
                    total_budget: 2500.0,
                    period: BudgetPeriod::Yearly,
                },
                date(2024, 2, 1),
            )
            .await
            .unwrap();

        assert_eq!(replaced.total_budget, 2500.0);
        assert_eq!(replaced.remaining_budget, 2500.0);
        assert_eq!(replaced.end_date, date(2025, 2, 1));

        let current = service.current_budget(7).await.unwrap().unwrap();
        assert_eq!(current.total_budget, 2500.0);
    }
}
