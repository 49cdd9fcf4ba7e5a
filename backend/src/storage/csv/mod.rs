//! File-backed storage: expenses in CSV, budgets in YAML.

pub mod budget_repository;
pub mod connection;
pub mod expense_repository;

#[cfg(test)]
pub mod test_utils;

pub use budget_repository::BudgetRepository;
pub use connection::CsvConnection;
pub use expense_repository::ExpenseRepository;
