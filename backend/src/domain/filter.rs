//! Expense list filtering.
//!
//! Every predicate is optional and an empty value matches everything. Active
//! predicates are combined with AND, and filtering never reorders or mutates
//! the underlying list.

use std::collections::{BTreeSet, HashSet};

use shared::AmountMatch;

use crate::domain::date_bucket::{DateBucketer, MonthKey};
use crate::domain::models::expense::Expense;

const AMOUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Case-insensitive substring of the description
    pub description: Option<String>,
    pub amount: Option<String>,
    pub amount_match: AmountMatch,
    pub paid_by: Option<String>,
    pub category: Option<String>,
    /// Long month name, compared with [`DateBucketer::month_name`]
    pub month: Option<String>,
    /// "YYYY-MM", compared with [`DateBucketer::month_key`]
    pub month_key: Option<String>,
    /// "YYYY-MM-DD", compared with [`DateBucketer::day_key`]
    pub day: Option<String>,
}

impl ExpenseFilter {
    pub fn for_month(month_key: MonthKey) -> Self {
        Self {
            month_key: Some(month_key.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        active(&self.description).is_none()
            && active(&self.amount).is_none()
            && active(&self.paid_by).is_none()
            && active(&self.category).is_none()
            && active(&self.month).is_none()
            && active(&self.month_key).is_none()
            && active(&self.day).is_none()
    }

    pub fn matches(&self, expense: &Expense, bucketer: &DateBucketer) -> bool {
        if let Some(needle) = active(&self.description) {
            if !expense
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        if let Some(amount) = active(&self.amount) {
            if !amount_matches(expense.amount, amount, self.amount_match) {
                return false;
            }
        }

        if let Some(paid_by) = active(&self.paid_by) {
            if expense.paid_by != paid_by {
                return false;
            }
        }

        if let Some(category) = active(&self.category) {
            if expense.category != category {
                return false;
            }
        }

        let date = expense.date.as_ref();

        if let Some(month) = active(&self.month) {
            if bucketer.month_name(date) != month {
                return false;
            }
        }

        if let Some(month_key) = active(&self.month_key) {
            let key = bucketer.month_key(date).map(|key| key.to_string());
            if key.as_deref() != Some(month_key) {
                return false;
            }
        }

        if let Some(day) = active(&self.day) {
            if bucketer.day_key(date).as_deref() != Some(day) {
                return false;
            }
        }

        true
    }

    /// Subsequence of `expenses` satisfying every active predicate
    pub fn apply<'a>(&self, expenses: &'a [Expense], bucketer: &DateBucketer) -> Vec<&'a Expense> {
        expenses
            .iter()
            .filter(|expense| self.matches(expense, bucketer))
            .collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn amount_matches(amount: f64, filter: &str, mode: AmountMatch) -> bool {
    match mode {
        AmountMatch::Exact => filter
            .parse::<f64>()
            .map(|wanted| (amount - wanted).abs() < AMOUNT_EPSILON)
            .unwrap_or(false),
        AmountMatch::Prefix => plain_amount(amount).starts_with(filter),
    }
}

/// Shortest decimal rendering of an amount ("100", "12.5")
pub fn plain_amount(amount: f64) -> String {
    format!("{}", amount)
}

/// Distinct month names in first-seen order
pub fn available_months(expenses: &[Expense], bucketer: &DateBucketer) -> Vec<String> {
    let mut seen = HashSet::new();
    expenses
        .iter()
        .map(|expense| bucketer.month_name(expense.date.as_ref()))
        .filter(|month| seen.insert(month.clone()))
        .collect()
}

/// Sorted month keys present in the data, always including `selected`.
/// Undated records count towards the current month, as in [`ExpenseFilter::for_month`].
pub fn available_month_keys(
    expenses: &[Expense],
    bucketer: &DateBucketer,
    selected: MonthKey,
) -> Vec<MonthKey> {
    let mut keys: BTreeSet<MonthKey> = expenses
        .iter()
        .filter_map(|expense| bucketer.month_key(expense.date.as_ref()))
        .collect();
    keys.insert(selected);
    keys.into_iter().collect()
}

pub fn distinct_payers(expenses: &[Expense]) -> Vec<String> {
    distinct_non_empty(expenses.iter().map(|expense| expense.paid_by.as_str()))
}

pub fn distinct_categories(expenses: &[Expense]) -> Vec<String> {
    distinct_non_empty(expenses.iter().map(|expense| expense.category.as_str()))
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .map(str::trim)
        .filter(|value| !value.is_empty() && seen.insert(value.to_string()))
        .map(str::to_string)
        .collect()
}
