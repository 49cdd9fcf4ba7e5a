//! # Budget Repository
//!
//! Monthly budgets are kept in one human-readable YAML map keyed by month:
//!
//! ```text
//! 2025-07:
//!   amount: 15000.0
//!   updated_at: 2025-07-01T09:30:00Z
//! ```
//!
//! Writes go through a temp file followed by a rename.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ChangeKind, Collection};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::connection::CsvConnection;
use crate::domain::date_bucket::MonthKey;
use crate::domain::models::budget::Budget;
use crate::storage::traits::BudgetStorage;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BudgetRecord {
    amount: f64,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct BudgetRepository {
    connection: CsvConnection,
}

impl BudgetRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_budgets(&self) -> Result<BTreeMap<MonthKey, BudgetRecord>> {
        let yaml_path = self.connection.budgets_file_path();
        if !yaml_path.exists() {
            debug!("No budgets file at {:?}", yaml_path);
            return Ok(BTreeMap::new());
        }

        let yaml_content = std::fs::read_to_string(&yaml_path)?;
        if yaml_content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(&yaml_content)?)
    }

    fn save_budgets(&self, budgets: &BTreeMap<MonthKey, BudgetRecord>) -> Result<()> {
        let yaml_path = self.connection.budgets_file_path();
        let yaml_content = serde_yaml::to_string(budgets)?;

        let temp_path = yaml_path.with_extension("yaml.tmp");
        std::fs::write(&temp_path, yaml_content)?;
        std::fs::rename(&temp_path, &yaml_path)?;

        debug!("Saved {} budgets to {:?}", budgets.len(), yaml_path);
        Ok(())
    }
}

#[async_trait]
impl BudgetStorage for BudgetRepository {
    async fn get_budget(&self, month_key: &MonthKey) -> Result<Option<Budget>> {
        let budgets = self.load_budgets()?;
        Ok(budgets.get(month_key).map(|record| Budget {
            month_key: *month_key,
            amount: record.amount,
            updated_at: record.updated_at,
        }))
    }

    async fn save_budget(&self, budget: &Budget) -> Result<()> {
        let _guard = self.connection.lock_for_write().await;

        let mut budgets = self.load_budgets()?;
        let kind = if budgets.contains_key(&budget.month_key) {
            ChangeKind::Updated
        } else {
            ChangeKind::Created
        };
        budgets.insert(
            budget.month_key,
            BudgetRecord {
                amount: budget.amount,
                updated_at: budget.updated_at,
            },
        );
        self.save_budgets(&budgets)?;

        info!("Saved budget {} for {}", budget.amount, budget.month_key);
        self.connection
            .change_feed()
            .publish(Collection::Budgets, kind, budget.month_key.to_string());
        Ok(())
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        Ok(self
            .load_budgets()?
            .into_iter()
            .map(|(month_key, record)| Budget {
                month_key,
                amount: record.amount,
                updated_at: record.updated_at,
            })
            .collect())
    }
}
