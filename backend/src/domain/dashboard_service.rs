//! Dashboard for a single month: category pie, most-spent category, daily
//! trend and the budget panel.

use anyhow::Result;
use shared::DashboardResponse;
use tracing::debug;

use crate::domain::aggregation::{by_category, daily_trend, most_spent};
use crate::domain::budget_service::BudgetService;
use crate::domain::date_bucket::MonthKey;
use crate::domain::expense_service::ExpenseService;
use crate::domain::filter::{available_month_keys, ExpenseFilter};
use crate::storage::Connection;

#[derive(Clone)]
pub struct DashboardService<C: Connection> {
    expense_service: ExpenseService<C>,
    budget_service: BudgetService<C>,
}

impl<C: Connection> DashboardService<C> {
    pub fn new(expense_service: ExpenseService<C>, budget_service: BudgetService<C>) -> Self {
        Self {
            expense_service,
            budget_service,
        }
    }

    /// Dashboard for `month`, the current month when `None`
    pub async fn month_view(&self, month: Option<MonthKey>) -> Result<DashboardResponse> {
        let bucketer = self.expense_service.bucketer();
        let month_key = month.unwrap_or_else(|| bucketer.current_month_key());

        let all = self.expense_service.all_expenses().await?;
        let month_expenses: Vec<_> = ExpenseFilter::for_month(month_key)
            .apply(&all, bucketer)
            .into_iter()
            .cloned()
            .collect();
        debug!("Dashboard {}: {} expenses", month_key, month_expenses.len());

        let category_breakdown = by_category(&month_expenses);
        let budget = self
            .budget_service
            .budget_status(month_key, &month_expenses)
            .await?;

        Ok(DashboardResponse {
            month_key: month_key.to_string(),
            month_keys: available_month_keys(&all, bucketer, month_key)
                .iter()
                .map(MonthKey::to_string)
                .collect(),
            expense_count: month_expenses.len(),
            most_spent: most_spent(&category_breakdown),
            category_breakdown,
            trend: daily_trend(&month_expenses, bucketer),
            budget,
        })
    }
}
