//! Domain-level command and query types.
//!
//! Services take and return these; the REST layer maps the public DTOs of
//! the `shared` crate onto them.

pub mod expenses {
    use crate::domain::models::expense::Expense;

    /// Input for recording a new expense
    #[derive(Debug, Clone)]
    pub struct CreateExpenseCommand {
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        pub category: String,
        /// RFC 3339 or YYYY-MM-DD; the current time when absent
        pub date: Option<String>,
    }

    /// Filtered expenses, newest first
    #[derive(Debug, Clone)]
    pub struct ExpenseListResult {
        pub expenses: Vec<Expense>,
        pub total: f64,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteExpenseResult {
        pub id: String,
        pub deleted: bool,
        pub success_message: String,
    }
}

pub mod budgets {
    use crate::domain::date_bucket::MonthKey;

    #[derive(Debug, Clone)]
    pub struct SaveBudgetCommand {
        pub month_key: MonthKey,
        pub amount: f64,
    }
}
