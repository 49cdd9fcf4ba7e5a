//! Monthly budget tracking.
//!
//! A budget is a single amount per calendar month. The panel shows how much
//! of it the month's expenses have used, classified into three bands.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use shared::{BudgetBand, BudgetStatus};
use std::sync::Arc;
use tracing::info;

use crate::domain::aggregation::grand_total;
use crate::domain::commands::budgets::SaveBudgetCommand;
use crate::domain::date_bucket::{DateBucketer, MonthKey};
use crate::domain::filter::ExpenseFilter;
use crate::domain::models::budget::{Budget, BudgetError};
use crate::domain::models::expense::Expense;
use crate::storage::{BudgetStorage, Connection};

/// Whole percentage of `budget` used by `spent`, clamped to 0..=100.
/// Without a positive budget nothing counts as used.
pub fn percent_used(spent: f64, budget: Option<f64>) -> u8 {
    let budget = match budget {
        Some(budget) if budget.is_finite() && budget > 0.0 => budget,
        _ => return 0,
    };
    if !spent.is_finite() || spent <= 0.0 {
        return 0;
    }
    let percent = (spent / budget.max(1.0) * 100.0).round();
    percent.min(100.0) as u8
}

pub fn band(percent: u8) -> BudgetBand {
    match percent {
        0..=49 => BudgetBand::Safe,
        50..=79 => BudgetBand::Warning,
        _ => BudgetBand::Critical,
    }
}

/// Panel state for a month from its budget (if any) and the month's spending
pub fn budget_status(month_key: MonthKey, budget: Option<&Budget>, spent: f64) -> BudgetStatus {
    let amount = budget.map(|b| b.amount);
    let percent = percent_used(spent, amount);
    let band = band(percent);
    BudgetStatus {
        month_key: month_key.to_string(),
        budget: amount,
        updated_at: budget.map(|b| b.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        spent,
        percent_used: percent,
        band,
        color: band.color().to_string(),
    }
}

#[derive(Clone)]
pub struct BudgetService<C: Connection> {
    budget_repository: C::BudgetRepository,
}

impl<C: Connection> BudgetService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            budget_repository: connection.create_budget_repository(),
        }
    }

    pub async fn get_budget(&self, month_key: &MonthKey) -> Result<Option<Budget>> {
        self.budget_repository.get_budget(month_key).await
    }

    pub async fn list_budgets(&self) -> Result<Vec<Budget>> {
        self.budget_repository.list_budgets().await
    }

    /// Create or replace the budget for a month
    pub async fn save_budget(&self, command: SaveBudgetCommand) -> Result<Budget> {
        if !command.amount.is_finite() || command.amount < 0.0 {
            return Err(BudgetError::InvalidAmount.into());
        }

        let budget = Budget {
            month_key: command.month_key,
            amount: command.amount,
            updated_at: Utc::now(),
        };
        self.budget_repository.save_budget(&budget).await?;
        info!("Budget for {} set to {}", budget.month_key, budget.amount);
        Ok(budget)
    }

    /// Status of every saved budget, oldest month first, against `expenses`
    pub async fn budget_statuses(
        &self,
        expenses: &[Expense],
        bucketer: &DateBucketer,
    ) -> Result<Vec<BudgetStatus>> {
        let budgets = self.list_budgets().await?;
        Ok(budgets
            .iter()
            .map(|budget| {
                let month_expenses: Vec<Expense> = ExpenseFilter::for_month(budget.month_key)
                    .apply(expenses, bucketer)
                    .into_iter()
                    .cloned()
                    .collect();
                budget_status(budget.month_key, Some(budget), grand_total(&month_expenses))
            })
            .collect())
    }

    /// Status for `month_key` given that month's expenses
    pub async fn budget_status(&self, month_key: MonthKey, month_expenses: &[Expense]) -> Result<BudgetStatus> {
        let budget = self.get_budget(&month_key).await?;
        Ok(budget_status(month_key, budget.as_ref(), grand_total(month_expenses)))
    }
}
