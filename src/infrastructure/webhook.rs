//! Forwarding of newly created expenses to an external automation
//! webhook. Delivery is best-effort: failures are logged and never
//! surface to the caller that recorded the expense.

use crate::domain::ledger::Expense;
use crate::infrastructure::http_client_factory::HttpClientFactory;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{Value, json};
use tracing::{debug, warn};

pub struct ExpenseIntakeWebhook {
    client: ClientWithMiddleware,
    url: String,
}

impl ExpenseIntakeWebhook {
    pub fn new(url: String) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            url,
        }
    }

    /// The intake payload shape the automation flow consumes.
    pub fn payload(user_id: i64, expense: &Expense, timestamp: DateTime<Utc>) -> Value {
        json!({
            "type": "expense",
            "user_id": user_id,
            "amount": expense.amount,
            "category": expense.category,
            "description": expense.description,
            "date": expense.date.to_string(),
            "timestamp": timestamp.to_rfc3339(),
        })
    }

    pub async fn notify_expense(&self, user_id: i64, expense: &Expense) {
        let body = Self::payload(user_id, expense, Utc::now());

        match self.client.post(&self.url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Expense webhook delivered for expense {}", expense.id);
            }
            Ok(response) => {
                warn!(
                    "Expense webhook returned {} for expense {}",
                    response.status(),
                    expense.id
                );
            }
            Err(e) => {
                warn!("Expense webhook failed for expense {}: {}", expense.id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn payload_matches_intake_shape() {
        let expense = Expense {
            id: 9,
            amount: 120.5,
            category: "feed".to_string(),
            description: "winter hay".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
            user_id: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let stamp = "2024-11-02T08:30:00Z".parse::<DateTime<Utc>>().unwrap();

        let payload = ExpenseIntakeWebhook::payload(3, &expense, stamp);
        assert_eq!(payload["type"], "expense");
        assert_eq!(payload["user_id"], 3);
        assert_eq!(payload["amount"], 120.5);
        assert_eq!(payload["category"], "feed");
        assert_eq!(payload["description"], "winter hay");
        assert_eq!(payload["date"], "2024-11-02");
        assert_eq!(payload["timestamp"], "2024-11-02T08:30:00+00:00");
    }
}
