//! # REST API for the Expense Table
//!
//! Formatted rows for the list view together with the filter option lists.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::ExpenseFilterRequest;
use tracing::{error, info};

use super::mappers::ExpenseMapper;
use crate::domain::models::expense::Expense;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/expenses/table", get(get_expense_table))
}

pub async fn get_expense_table(
    State(state): State<AppState>,
    Query(query): Query<ExpenseFilterRequest>,
) -> impl IntoResponse {
    info!("GET /api/expenses/table - query: {:?}", query);

    let filter = ExpenseMapper::to_filter(query);
    match state.expense_service.all_expenses().await {
        Ok(all) => {
            let filtered: Vec<Expense> = filter
                .apply(&all, &state.bucketer)
                .into_iter()
                .cloned()
                .collect();
            let table = state.expense_table_service.build_table(&all, &filtered);
            (StatusCode::OK, Json(table)).into_response()
        }
        Err(e) => {
            error!("Failed to build expense table: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load expenses").into_response()
        }
    }
}
