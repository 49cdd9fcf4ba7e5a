//! # Storage Layer
//!
//! Persistence for expenses and budgets behind the traits in [`traits`].
//! The CSV implementation is the only backend; services are generic over
//! [`Connection`] so tests and alternative stores can be swapped in.

pub mod change_feed;
pub mod csv;
pub mod traits;

pub use change_feed::ChangeFeed;
pub use csv::CsvConnection;
pub use traits::{BudgetStorage, Connection, ExpenseStorage};
