use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::date_bucket::MonthKey;

/// Budget for one calendar month. At most one exists per month key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub month_key: MonthKey,
    pub amount: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("Budget amount must be a non-negative number")]
    InvalidAmount,
}
