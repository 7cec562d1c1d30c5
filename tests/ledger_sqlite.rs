//! Ledger flow against a real SQLite database: registration, CRUD,
//! budget replacement, and the analytics summary.

use chrono::NaiveDate;
use farmledger::application::analytics::AnalyticsService;
use farmledger::application::ledger_service::LedgerService;
use farmledger::domain::errors::LedgerError;
use farmledger::domain::ledger::{
    BudgetPeriod, ExpenseUpdate, NewBudget, NewExpense, NewLivestock, NewRevenue, NewUser,
};
use farmledger::infrastructure::persistence::{
    Database, SqliteBudgetRepository, SqliteExpenseRepository, SqliteLivestockRepository,
    SqliteRevenueRepository, SqliteUserRepository,
};
use std::sync::Arc;

struct Harness {
    ledger: LedgerService,
    analytics: AnalyticsService,
}

async fn harness() -> Harness {
    let db = Database::in_memory().await.expect("in-memory database");

    let expenses = Arc::new(SqliteExpenseRepository::new(db.pool.clone()));
    let livestock = Arc::new(SqliteLivestockRepository::new(db.pool.clone()));
    let budgets = Arc::new(SqliteBudgetRepository::new(db.pool.clone()));

    let ledger = LedgerService::new(
        Arc::new(SqliteUserRepository::new(db.pool.clone())),
        expenses.clone(),
        Arc::new(SqliteRevenueRepository::new(db.pool.clone())),
        livestock.clone(),
        budgets.clone(),
        None,
    );
    let analytics = AnalyticsService::new(expenses, livestock, budgets);

    Harness { ledger, analytics }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn register(ledger: &LedgerService, username: &str) -> i64 {
    ledger
        .register_user(&NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "hunter2hunter2".to_string(),
        })
        .await
        .expect("registration")
        .id
}

#[tokio::test]
async fn registration_and_login_round_trip() {
    let h = harness().await;
    let id = register(&h.ledger, "ada").await;

    let user = h
        .ledger
        .verify_credentials("ada", "hunter2hunter2")
        .await
        .unwrap()
        .expect("valid credentials");
    assert_eq!(user.id, id);
    assert_eq!(user.email, "ada@example.com");

    assert!(
        h.ledger
            .verify_credentials("ada", "wrong")
            .await
            .unwrap()
            .is_none()
    );

    let err = h
        .ledger
        .register_user(&NewUser {
            username: "ada".to_string(),
            email: "second@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[tokio::test]
async fn expense_crud_is_user_scoped() {
    let h = harness().await;
    let ada = register(&h.ledger, "ada").await;
    let grace = register(&h.ledger, "grace").await;

    let expense = h
        .ledger
        .create_expense(
            ada,
            &NewExpense {
                amount: 120.0,
                category: "feed".to_string(),
                description: Some("winter hay".to_string()),
                date: date(2024, 11, 2),
            },
        )
        .await
        .unwrap();

    // Other users cannot see or touch it.
    assert!(h.ledger.expenses_for(grace).await.unwrap().is_empty());
    let err = h
        .ledger
        .update_expense(grace, expense.id, &ExpenseUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));

    let updated = h
        .ledger
        .update_expense(
            ada,
            expense.id,
            &ExpenseUpdate {
                amount: Some(99.5),
                description: Some("winter hay, discounted".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, 99.5);
    assert_eq!(updated.category, "feed");
    assert_eq!(updated.date, date(2024, 11, 2));

    h.ledger.delete_expense(ada, expense.id).await.unwrap();
    assert!(h.ledger.expenses_for(ada).await.unwrap().is_empty());
}

#[tokio::test]
async fn listings_order_by_date_descending() {
    let h = harness().await;
    let ada = register(&h.ledger, "ada").await;

    for (amount, day) in [
        (10.0, date(2024, 1, 10)),
        (30.0, date(2024, 3, 10)),
        (20.0, date(2024, 2, 10)),
    ] {
        h.ledger
            .create_expense(
                ada,
                &NewExpense {
                    amount,
                    category: "vet".to_string(),
                    description: None,
                    date: day,
                },
            )
            .await
            .unwrap();
    }

    let amounts: Vec<f64> = h
        .ledger
        .expenses_for(ada)
        .await
        .unwrap()
        .iter()
        .map(|e| e.amount)
        .collect();
    assert_eq!(amounts, vec![30.0, 20.0, 10.0]);
}

#[tokio::test]
async fn revenue_crud_round_trip() {
    let h = harness().await;
    let ada = register(&h.ledger, "ada").await;

    let revenue = h
        .ledger
        .create_revenue(
            ada,
            &NewRevenue {
                amount: 850.0,
                source: "milk".to_string(),
                description: None,
                date: date(2024, 6, 1),
            },
        )
        .await
        .unwrap();
    assert_eq!(revenue.description, "");

    let listed = h.ledger.revenues_for(ada).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].source, "milk");

    h.ledger.delete_revenue(ada, revenue.id).await.unwrap();
    let err = h.ledger.delete_revenue(ada, revenue.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "Revenue" }));
}

#[tokio::test]
async fn livestock_optional_fields_round_trip() {
    let h = harness().await;
    let ada = register(&h.ledger, "ada").await;

    h.ledger
        .add_livestock(
            ada,
            &NewLivestock {
                kind: "cattle".to_string(),
                breed: Some("angus".to_string()),
                quantity: 5,
                age_months: Some(30),
                weight_kg: Some(410.5),
                purchase_date: Some(date(2023, 4, 18)),
                purchase_price: Some(900.0),
                notes: None,
            },
        )
        .await
        .unwrap();
    h.ledger
        .add_livestock(
            ada,
            &NewLivestock {
                kind: "chickens".to_string(),
                breed: None,
                quantity: 20,
                age_months: None,
                weight_kg: None,
                purchase_date: None,
                purchase_price: None,
                notes: Some("layers".to_string()),
            },
        )
        .await
        .unwrap();

    let herd = h.ledger.livestock_for(ada).await.unwrap();
    assert_eq!(herd.len(), 2);

    let cattle = herd.iter().find(|l| l.kind == "cattle").unwrap();
    assert_eq!(cattle.breed.as_deref(), Some("angus"));
    assert_eq!(cattle.purchase_date, Some(date(2023, 4, 18)));
    assert_eq!(cattle.weight_kg, Some(410.5));

    let chickens = herd.iter().find(|l| l.kind == "chickens").unwrap();
    assert!(chickens.breed.is_none());
    assert!(chickens.purchase_price.is_none());
    assert_eq!(chickens.notes.as_deref(), Some("layers"));
}

#[tokio::test]
async fn budget_replacement_and_period_arithmetic() {
    let h = harness().await;
    let ada = register(&h.ledger, "ada").await;

    let first = h
        .ledger
        .set_budget(
            ada,
            &NewBudget {
                total_budget: 1500.0,
                period: BudgetPeriod::Monthly,
            },
            date(2024, 1, 31),
        )
        .await
        .unwrap();
    // Clamped to the shorter month.
    assert_eq!(first.end_date, date(2024, 2, 29));
    assert_eq!(first.remaining_budget, 1500.0);

    let second = h
        .ledger
        .set_budget(
            ada,
            &NewBudget {
                total_budget: 20_000.0,
                period: BudgetPeriod::Yearly,
            },
            date(2024, 12, 15),
        )
        .await
        .unwrap();
    assert_eq!(second.end_date, date(2025, 12, 15));

    let current = h.ledger.current_budget(ada).await.unwrap().unwrap();
    assert_eq!(current.id, second.id);
    assert_eq!(current.period, BudgetPeriod::Yearly);
}

#[tokio::test]
async fn analytics_summary_aggregates_the_month() {
    let h = harness().await;
    let ada = register(&h.ledger, "ada").await;

    for (amount, day) in [
        (100.0, date(2024, 5, 3)),
        (45.25, date(2024, 5, 30)),
        (999.0, date(2024, 4, 30)),
    ] {
        h.ledger
            .create_expense(
                ada,
                &NewExpense {
                    amount,
                    category: "feed".to_string(),
                    description: None,
                    date: day,
                },
            )
            .await
            .unwrap();
    }

    h.ledger
        .add_livestock(
            ada,
            &NewLivestock {
                kind: "goats".to_string(),
                breed: None,
                quantity: 4,
                age_months: None,
                weight_kg: None,
                purchase_date: None,
                purchase_price: Some(150.0),
                notes: None,
            },
        )
        .await
        .unwrap();

    h.ledger
        .set_budget(
            ada,
            &NewBudget {
                total_budget: 2000.0,
                period: BudgetPeriod::Monthly,
            },
            date(2024, 5, 1),
        )
        .await
        .unwrap();

    let summary = h
        .analytics
        .monthly_summary(ada, date(2024, 5, 15))
        .await
        .unwrap();
    assert_eq!(summary.total_expenses_month, 145.25);
    assert_eq!(summary.total_livestock_value, 600.0);
    assert_eq!(summary.livestock_count, 4);
    assert_eq!(summary.budget.unwrap().total_budget, 2000.0);
}
