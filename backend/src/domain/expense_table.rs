//! Expense table domain logic.
//!
//! Turns stored expenses into display rows for the list view and builds the
//! option lists that back the filter and edit dropdowns.
//!
//! ## Key Responsibilities
//!
//! - **Row Formatting**: month label, day key and currency-formatted amount
//! - **Totals**: formatted total of the currently filtered rows
//! - **Option Lists**: configured payers/categories merged with values in the data

use shared::{ExpenseTableResponse, FilterOptions, FormattedExpense};

use crate::domain::aggregation::grand_total;
use crate::domain::date_bucket::{DateBucketer, MonthKey};
use crate::domain::expense_form::{ExpenseFormConfig, ExpenseFormService};
use crate::domain::filter::{
    available_month_keys, available_months, distinct_categories, distinct_payers,
};
use crate::domain::models::expense::Expense;

#[derive(Clone)]
pub struct ExpenseTableService {
    config: ExpenseFormConfig,
    bucketer: DateBucketer,
}

impl ExpenseTableService {
    pub fn new(config: ExpenseFormConfig, bucketer: DateBucketer) -> Self {
        Self { config, bucketer }
    }

    /// Format a list of expenses for table display
    pub fn format_expenses_for_table(&self, expenses: &[Expense]) -> Vec<FormattedExpense> {
        expenses
            .iter()
            .map(|expense| self.format_single_expense(expense))
            .collect()
    }

    pub fn format_single_expense(&self, expense: &Expense) -> FormattedExpense {
        let date = expense.date.as_ref();
        FormattedExpense {
            id: expense.id.clone(),
            month: self.bucketer.month_name(date),
            description: expense.description.clone(),
            formatted_amount: self.format_amount(expense.amount),
            raw_amount: expense.amount,
            category: expense.category.clone(),
            paid_by: expense.paid_by.clone(),
            day: self.bucketer.day_key(date),
        }
    }

    /// Currency amount with thousands separators, e.g. "₹1,234.50"
    pub fn format_amount(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let fixed = format!("{:.2}", amount.abs());
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!("{}{}{}.{}", sign, self.config.currency_symbol, grouped, fraction)
    }

    /// Option lists for the filter bar. `selected` is always offered as a month key.
    pub fn filter_options(&self, expenses: &[Expense], selected: MonthKey) -> FilterOptions {
        FilterOptions {
            months: available_months(expenses, &self.bucketer),
            month_keys: available_month_keys(expenses, &self.bucketer, selected)
                .iter()
                .map(MonthKey::to_string)
                .collect(),
            categories: ExpenseFormService::merge_options(
                &self.config.categories,
                distinct_categories(expenses),
            ),
            payers: ExpenseFormService::merge_options(&self.config.payers, distinct_payers(expenses)),
        }
    }

    /// Table for `filtered`, with option lists drawn from `all`
    pub fn build_table(&self, all: &[Expense], filtered: &[Expense]) -> ExpenseTableResponse {
        let total = grand_total(filtered);
        ExpenseTableResponse {
            rows: self.format_expenses_for_table(filtered),
            total,
            formatted_total: self.format_amount(total),
            options: self.filter_options(all, self.bucketer.current_month_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::date_bucket::DateValue;

    fn create_test_service() -> ExpenseTableService {
        ExpenseTableService::new(ExpenseFormConfig::default(), DateBucketer::utc())
    }

    fn expense(amount: f64, payer: &str, category: &str, date: Option<&str>) -> Expense {
        Expense {
            id: Expense::generate_id(),
            amount,
            description: "Weekly shop".to_string(),
            paid_by: payer.to_string(),
            category: category.to_string(),
            date: date.map(|d| DateValue::Text(d.to_string())),
            created_at: None,
        }
    }

    #[test]
    fn test_format_amount() {
        let service = create_test_service();
        assert_eq!(service.format_amount(0.0), "₹0.00");
        assert_eq!(service.format_amount(12.5), "₹12.50");
        assert_eq!(service.format_amount(1234.5), "₹1,234.50");
        assert_eq!(service.format_amount(1234567.891), "₹1,234,567.89");
        assert_eq!(service.format_amount(-250.0), "-₹250.00");
        assert_eq!(service.format_amount(f64::NAN), "₹0.00");
    }

    #[test]
    fn test_format_single_expense() {
        let service = create_test_service();
        let dated = expense(99.0, "Rajat", "Meat", Some("2025-03-09"));

        let row = service.format_single_expense(&dated);
        assert_eq!(row.month, "March");
        assert_eq!(row.day.as_deref(), Some("2025-03-09"));
        assert_eq!(row.formatted_amount, "₹99.00");
        assert_eq!(row.raw_amount, 99.0);

        let undated = service.format_single_expense(&expense(1.0, "Rajat", "Meat", None));
        assert_eq!(undated.month, "July");
        assert!(undated.day.is_none());
    }

    #[test]
    fn test_filter_options_merge_configured_values() {
        let service = create_test_service();
        let expenses = vec![
            expense(10.0, "Priya", "Snacks", Some("2025-05-01")),
            expense(10.0, "Rajat", "Meat", Some("2025-06-01")),
        ];

        let options = service.filter_options(&expenses, "2025-07".parse().unwrap());
        assert_eq!(options.payers, vec!["Nishant", "Rajat", "Rahul", "Priya"]);
        assert_eq!(
            options.categories,
            vec!["Groceries", "Outside Food", "Meat", "Other", "Snacks"]
        );
        assert_eq!(options.months, vec!["May", "June"]);
        assert_eq!(options.month_keys, vec!["2025-05", "2025-06", "2025-07"]);
    }

    #[test]
    fn test_build_table_totals_filtered_rows() {
        let service = create_test_service();
        let all = vec![
            expense(1000.0, "Nishant", "Groceries", Some("2025-05-01")),
            expense(234.5, "Rajat", "Meat", Some("2025-05-02")),
            expense(10.0, "Rahul", "Other", Some("2025-05-03")),
        ];
        let filtered = all[..2].to_vec();

        let table = service.build_table(&all, &filtered);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.total, 1234.5);
        assert_eq!(table.formatted_total, "₹1,234.50");
        assert!(table.options.payers.contains(&"Rahul".to_string()));
    }
}
