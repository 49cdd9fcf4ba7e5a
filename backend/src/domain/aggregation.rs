//! Aggregation of expenses into chart series.
//!
//! Grouped sums keep the first-seen order of their keys. The daily trend is
//! always sorted chronologically.

use std::collections::{BTreeMap, HashMap};

use shared::{ChartPoint, TrendPoint};

use crate::domain::date_bucket::DateBucketer;
use crate::domain::models::expense::Expense;

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const UNKNOWN_PAYER_LABEL: &str = "Unknown";

/// Amount that is safe to add to a running total. Negative and non-finite
/// amounts count as zero.
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        0.0
    }
}

/// Sum amounts per key produced by `key_fn`
pub fn totals_by<'a, I, F>(expenses: I, key_fn: F) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'a Expense>,
    F: Fn(&Expense) -> String,
{
    let mut points: Vec<ChartPoint> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        let key = key_fn(expense);
        let amount = sanitize_amount(expense.amount);
        match positions.get(&key) {
            Some(&index) => points[index].value += amount,
            None => {
                positions.insert(key.clone(), points.len());
                points.push(ChartPoint { name: key, value: amount });
            }
        }
    }

    points
}

/// Contribution per payer
pub fn by_payer<'a, I>(expenses: I) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'a Expense>,
{
    totals_by(expenses, |expense| label_or(&expense.paid_by, UNKNOWN_PAYER_LABEL))
}

/// Breakdown per category, empty categories grouped as "Uncategorized"
pub fn by_category<'a, I>(expenses: I) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'a Expense>,
{
    totals_by(expenses, |expense| label_or(&expense.category, UNCATEGORIZED_LABEL))
}

/// Spending per calendar day in ascending date order. Undated records are skipped.
pub fn daily_trend<'a, I>(expenses: I, bucketer: &DateBucketer) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut days = BTreeMap::new();
    for expense in expenses {
        if let Some(day) = bucketer.local_date(expense.date.as_ref()) {
            *days.entry(day).or_insert(0.0) += sanitize_amount(expense.amount);
        }
    }

    days.into_iter()
        .map(|(day, value)| TrendPoint {
            date: day.format("%Y-%m-%d").to_string(),
            value,
        })
        .collect()
}

pub fn grand_total<'a, I>(expenses: I) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses
        .into_iter()
        .map(|expense| sanitize_amount(expense.amount))
        .sum()
}

/// Largest slice of a breakdown; ties go to the first-seen key
pub fn most_spent(points: &[ChartPoint]) -> Option<ChartPoint> {
    points
        .iter()
        .fold(None::<&ChartPoint>, |best, point| match best {
            Some(current) if current.value >= point.value => Some(current),
            _ => Some(point),
        })
        .cloned()
}

fn label_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
