use serde::{Deserialize, Serialize};
use std::fmt;

/// Expense as exposed to clients. Dates are already normalized by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Opaque key assigned by the store, "expense::<uuid>"
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    /// Empty when the expense was never categorized
    pub category: String,
    /// RFC 3339 timestamp in the configured display offset, None when unparseable
    pub date: Option<String>,
    /// Long month name ("March"), or the fallback label
    pub month: String,
    /// Sortable "YYYY-MM" bucket, None when the stored date can't be read
    pub month_key: Option<String>,
    /// Creation time assigned by the store (RFC 3339)
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    /// Free text, required (max 256 characters)
    pub description: String,
    pub paid_by: String,
    #[serde(default)]
    pub category: String,
    /// Optional date override (RFC 3339 or YYYY-MM-DD) - uses current time if not provided
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseResponse {
    pub expense: Expense,
    pub success_message: String,
}

/// Field-level update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub paid_by: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteExpenseResponse {
    pub id: String,
    pub deleted: bool,
    pub success_message: String,
}

/// How an amount filter is compared against an expense amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountMatch {
    /// Numeric equality
    #[default]
    Exact,
    /// The plain rendering of the amount starts with the filter text
    Prefix,
}

/// Filter predicates for the expense list. Empty values match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseFilterRequest {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub amount_match: AmountMatch,
    pub paid_by: Option<String>,
    pub category: Option<String>,
    /// Long month name, e.g. "July"
    pub month: Option<String>,
    /// "YYYY-MM"
    pub month_key: Option<String>,
    /// "YYYY-MM-DD"
    pub day: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub count: usize,
    pub total: f64,
}

/// A row of the expense table, formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedExpense {
    pub id: String,
    pub month: String,
    pub description: String,
    pub formatted_amount: String,
    pub raw_amount: f64,
    pub category: String,
    pub paid_by: String,
    pub day: Option<String>,
}

/// Option lists for the filter and edit dropdowns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub month_keys: Vec<String>,
    pub categories: Vec<String>,
    pub payers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTableResponse {
    pub rows: Vec<FormattedExpense>,
    pub total: f64,
    pub formatted_total: String,
    pub options: FilterOptions,
}

/// Request body for validating entry form input without writing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateExpenseRequest {
    pub description: String,
    pub amount_input: String,
    #[serde(default)]
    pub paid_by: String,
    #[serde(default)]
    pub category: String,
}

/// Validation result for the expense entry form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFormValidation {
    pub is_valid: bool,
    pub errors: Vec<ExpenseValidationError>,
    pub cleaned_amount: Option<f64>,
    pub messages: Vec<String>,
}

/// Specific validation errors for expense input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpenseValidationError {
    EmptyDescription,
    DescriptionTooLong(usize),
    EmptyAmount,
    InvalidAmountFormat(String),
    AmountNotPositive,
    EmptyPayer,
    EmptyCategory,
    InvalidDate(String),
}

/// Name/value pair for pie charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

/// One day of the spending trend line, `date` is "YYYY-MM-DD"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResponse {
    pub points: Vec<ChartPoint>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResponse {
    pub points: Vec<TrendPoint>,
    pub total: f64,
}

/// Three-tier budget usage classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBand {
    /// Below 50% used
    Safe,
    /// 50% to 79% used
    Warning,
    /// 80% or more used
    Critical,
}

impl BudgetBand {
    pub fn color(&self) -> &'static str {
        match self {
            BudgetBand::Safe => "#28a745",
            BudgetBand::Warning => "#ff9800",
            BudgetBand::Critical => "#e53935",
        }
    }
}

impl fmt::Display for BudgetBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetBand::Safe => "safe",
            BudgetBand::Warning => "warning",
            BudgetBand::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Budget panel state for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub month_key: String,
    /// None means no budget has been saved for this month
    pub budget: Option<f64>,
    pub updated_at: Option<String>,
    pub spent: f64,
    pub percent_used: u8,
    pub band: BudgetBand,
    pub color: String,
}

/// Every saved budget, oldest month first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetListResponse {
    pub budgets: Vec<BudgetStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBudgetRequest {
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBudgetResponse {
    pub status: BudgetStatus,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    /// "YYYY-MM", defaults to the current month
    pub month: Option<String>,
}

/// Everything the dashboard renders for a single month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub month_key: String,
    pub month_keys: Vec<String>,
    pub expense_count: usize,
    pub category_breakdown: Vec<ChartPoint>,
    pub most_spent: Option<ChartPoint>,
    pub trend: Vec<TrendPoint>,
    pub budget: BudgetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousSignInResponse {
    pub uid: String,
    pub created_at: String,
}

/// Collections the store publishes changes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Expenses,
    Budgets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Change notification pushed to live subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    /// Expense id or budget month key
    pub key: String,
}

/// Client-side log entry forwarded to the server log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}
