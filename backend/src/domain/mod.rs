//! # Domain Layer
//!
//! Business logic of the expense tracker. Pure functions (date bucketing,
//! filtering, aggregation, budget percentages) sit next to the services that
//! orchestrate storage.

pub mod aggregation;
pub mod auth_service;
pub mod budget_service;
pub mod commands;
pub mod dashboard_service;
pub mod date_bucket;
pub mod expense_form;
pub mod expense_service;
pub mod expense_table;
pub mod filter;
pub mod models;

pub use auth_service::AuthService;
pub use budget_service::BudgetService;
pub use dashboard_service::DashboardService;
pub use date_bucket::{DateBucketer, DateValue, MonthKey};
pub use expense_form::{ExpenseFormConfig, ExpenseFormService};
pub use expense_service::ExpenseService;
pub use expense_table::ExpenseTableService;
pub use filter::ExpenseFilter;
