//! # Storage Traits
//!
//! Storage abstractions used by the domain layer. Services depend on these
//! traits only, so a different backend can be plugged in without touching the
//! business logic.

use anyhow::Result;
use async_trait::async_trait;
use shared::ChangeEvent;
use tokio::sync::broadcast;

use crate::domain::date_bucket::MonthKey;
use crate::domain::models::budget::Budget;
use crate::domain::models::expense::{Expense, ExpenseChanges};

/// Interface for expense storage operations
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Store a new expense
    async fn store_expense(&self, expense: &Expense) -> Result<()>;

    /// Retrieve a specific expense by ID
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>>;

    /// List every expense in insertion order
    async fn list_expenses(&self) -> Result<Vec<Expense>>;

    /// Apply a field group to an existing expense.
    /// Returns the updated record, or None if the id does not exist.
    async fn update_expense_fields(
        &self,
        expense_id: &str,
        changes: &ExpenseChanges,
    ) -> Result<Option<Expense>>;

    /// Delete a single expense
    /// Returns true if the expense was found and deleted, false otherwise
    async fn delete_expense(&self, expense_id: &str) -> Result<bool>;
}

/// Interface for monthly budget storage operations
#[async_trait]
pub trait BudgetStorage: Send + Sync {
    async fn get_budget(&self, month_key: &MonthKey) -> Result<Option<Budget>>;

    /// Create or replace the budget for its month
    async fn save_budget(&self, budget: &Budget) -> Result<()>;

    /// All budgets ordered by month key
    async fn list_budgets(&self) -> Result<Vec<Budget>>;
}

/// A storage connection hands out repositories and a feed of changes made
/// through them.
pub trait Connection: Send + Sync + Clone + 'static {
    type ExpenseRepository: ExpenseStorage + Clone;
    type BudgetRepository: BudgetStorage + Clone;

    fn create_expense_repository(&self) -> Self::ExpenseRepository;

    fn create_budget_repository(&self) -> Self::BudgetRepository;

    /// Subscribe to changes committed after this call
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
