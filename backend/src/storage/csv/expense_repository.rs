//! # CSV Expense Repository
//!
//! Expenses live in a single `expenses.csv` under the data directory:
//!
//! ```text
//! id,amount,description,paid_by,category,date,created_at
//! ```
//!
//! The `date` column holds the JSON form of a [`DateValue`] so that every
//! representation a record arrived with survives a round trip. A value that is
//! not JSON is read back as free text. Rows are never rejected on read; a bad
//! amount reads as 0.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ReaderBuilder, Writer};
use shared::{ChangeKind, Collection};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing::{debug, info};

use super::connection::CsvConnection;
use crate::domain::date_bucket::DateValue;
use crate::domain::models::expense::{Expense, ExpenseChanges};
use crate::storage::traits::ExpenseStorage;

const HEADER: [&str; 7] = [
    "id",
    "amount",
    "description",
    "paid_by",
    "category",
    "date",
    "created_at",
];

#[derive(Clone)]
pub struct ExpenseRepository {
    connection: CsvConnection,
}

impl ExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_expenses(&self) -> Result<Vec<Expense>> {
        let file_path = self.connection.expenses_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut expenses = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let expense = Expense {
                id: record.get(0).unwrap_or("").to_string(),
                amount: record.get(1).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                description: record.get(2).unwrap_or("").to_string(),
                paid_by: record.get(3).unwrap_or("").to_string(),
                category: record.get(4).unwrap_or("").to_string(),
                date: decode_date(record.get(5).unwrap_or("")),
                created_at: decode_created_at(record.get(6).unwrap_or("")),
            };

            expenses.push(expense);
        }

        Ok(expenses)
    }

    fn write_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let file_path = self.connection.expenses_file_path();
        let temp_path = file_path.with_extension("csv.tmp");

        {
            let file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            csv_writer.write_record(HEADER)?;

            for expense in expenses {
                let amount = expense.amount.to_string();
                let date = encode_date(expense.date.as_ref())?;
                let created_at = expense
                    .created_at
                    .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                    .unwrap_or_default();

                csv_writer.write_record([
                    expense.id.as_str(),
                    amount.as_str(),
                    expense.description.as_str(),
                    expense.paid_by.as_str(),
                    expense.category.as_str(),
                    date.as_str(),
                    created_at.as_str(),
                ])?;
            }

            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        debug!("Wrote {} expenses to {:?}", expenses.len(), file_path);
        Ok(())
    }
}

fn encode_date(date: Option<&DateValue>) -> Result<String> {
    match date {
        Some(value) => Ok(serde_json::to_string(value)?),
        None => Ok(String::new()),
    }
}

fn decode_date(raw: &str) -> Option<DateValue> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<DateValue>(raw) {
        Ok(value) => Some(value),
        Err(_) => Some(DateValue::Text(raw.to_string())),
    }
}

fn decode_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[async_trait]
impl ExpenseStorage for ExpenseRepository {
    async fn store_expense(&self, expense: &Expense) -> Result<()> {
        let _guard = self.connection.lock_for_write().await;

        let mut expenses = self.read_expenses()?;
        expenses.push(expense.clone());
        self.write_expenses(&expenses)?;

        info!("Stored expense {}", expense.id);
        self.connection
            .change_feed()
            .publish(Collection::Expenses, ChangeKind::Created, expense.id.clone());
        Ok(())
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>> {
        let expenses = self.read_expenses()?;
        Ok(expenses.into_iter().find(|e| e.id == expense_id))
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.read_expenses()
    }

    async fn update_expense_fields(
        &self,
        expense_id: &str,
        changes: &ExpenseChanges,
    ) -> Result<Option<Expense>> {
        let _guard = self.connection.lock_for_write().await;

        let mut expenses = self.read_expenses()?;
        let updated = match expenses.iter_mut().find(|e| e.id == expense_id) {
            Some(expense) => {
                changes.apply_to(expense);
                expense.clone()
            }
            None => return Ok(None),
        };
        self.write_expenses(&expenses)?;

        info!("Updated expense {}", expense_id);
        self.connection
            .change_feed()
            .publish(Collection::Expenses, ChangeKind::Updated, expense_id);
        Ok(Some(updated))
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_for_write().await;

        let mut expenses = self.read_expenses()?;
        let before = expenses.len();
        expenses.retain(|e| e.id != expense_id);
        if expenses.len() == before {
            debug!("Expense {} not found for delete", expense_id);
            return Ok(false);
        }
        self.write_expenses(&expenses)?;

        info!("Deleted expense {}", expense_id);
        self.connection
            .change_feed()
            .publish(Collection::Expenses, ChangeKind::Deleted, expense_id);
        Ok(true)
    }
}
