use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::date_bucket::DateValue;

/// Expense record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    pub category: String,
    pub date: Option<DateValue>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn generate_id() -> String {
        format!("expense::{}", Uuid::new_v4())
    }
}

/// Field group written by an inline edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub paid_by: Option<String>,
    pub category: Option<String>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.paid_by.is_none()
            && self.category.is_none()
    }

    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(description) = &self.description {
            expense.description = description.trim().to_string();
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(paid_by) = &self.paid_by {
            expense.paid_by = paid_by.trim().to_string();
        }
        if let Some(category) = &self.category {
            expense.category = category.trim().to_string();
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("{0}")]
    Validation(String),
    #[error("Expense {0} not found")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expense {
        Expense {
            id: Expense::generate_id(),
            amount: 40.0,
            description: "Eggs".to_string(),
            paid_by: "Rahul".to_string(),
            category: "Groceries".to_string(),
            date: None,
            created_at: None,
        }
    }

    #[test]
    fn test_generate_id_is_prefixed_and_unique() {
        let first = Expense::generate_id();
        let second = Expense::generate_id();
        assert!(first.starts_with("expense::"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_apply_changes_only_touches_given_fields() {
        let mut expense = sample();
        let changes = ExpenseChanges {
            amount: Some(55.5),
            category: Some(" Meat ".to_string()),
            ..Default::default()
        };
        changes.apply_to(&mut expense);

        assert_eq!(expense.amount, 55.5);
        assert_eq!(expense.category, "Meat");
        assert_eq!(expense.description, "Eggs");
        assert_eq!(expense.paid_by, "Rahul");
        assert!(!changes.is_empty());
        assert!(ExpenseChanges::default().is_empty());
    }
}
