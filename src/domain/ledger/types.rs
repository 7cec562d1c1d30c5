use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered account. Everything in the ledger hangs off a user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub id: i64,
    pub amount: f64,
    pub source: String,
    pub description: String,
    pub date: NaiveDate,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRevenue {
    pub amount: f64,
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueUpdate {
    pub amount: Option<f64>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Herd entry. `kind` serializes as `type` to match the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Livestock {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: Option<String>,
    pub quantity: i64,
    pub age_months: Option<i64>,
    pub weight_kg: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub notes: Option<String>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLivestock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub breed: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub age_months: Option<i64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Yearly,
}

impl FromStr for BudgetPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            _ => anyhow::bail!("Invalid budget period: {}. Must be 'monthly' or 'yearly'", s),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetPeriod::Monthly => write!(f, "monthly"),
            BudgetPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// The single live budget for a user. Replaced wholesale on each create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub total_budget: f64,
    pub remaining_budget: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub total_budget: f64,
    #[serde(default = "default_period")]
    pub period: BudgetPeriod,
}

fn default_period() -> BudgetPeriod {
    BudgetPeriod::Monthly
}

/// Aggregate figures for the dashboard summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_expenses_month: f64,
    pub total_livestock_value: f64,
    pub livestock_count: i64,
    pub budget: Option<Budget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_period_round_trips_through_str() {
        assert_eq!("monthly".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Monthly);
        assert_eq!("YEARLY".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Yearly);
        assert_eq!(BudgetPeriod::Monthly.to_string(), "monthly");
        assert!("weekly".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
    }

    #[test]
    fn livestock_kind_serializes_as_type() {
        let json = serde_json::json!({"type": "cattle", "quantity": 4});
        let parsed: NewLivestock = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind, "cattle");
        assert_eq!(parsed.quantity, 4);
        assert!(parsed.breed.is_none());
    }
}
