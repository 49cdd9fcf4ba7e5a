//! # REST API for Expenses
//!
//! Create, list, validate, edit and delete expenses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use shared::{
    CreateExpenseRequest, CreateExpenseResponse, DeleteExpenseResponse, ExpenseFilterRequest,
    ExpenseListResponse, UpdateExpenseRequest, ValidateExpenseRequest,
};
use tracing::{error, info, warn};

use super::mappers::ExpenseMapper;
use crate::domain::models::expense::ExpenseError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/validate", post(validate_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

/// Domain errors become 400/404, anything else is a 500 with a generic message
fn error_response(e: anyhow::Error, failure_message: &str) -> Response {
    match e.downcast_ref::<ExpenseError>() {
        Some(ExpenseError::Validation(message)) => {
            warn!("{}: {}", failure_message, message);
            (StatusCode::BAD_REQUEST, message.clone()).into_response()
        }
        Some(ExpenseError::NotFound(id)) => {
            warn!("{}: expense {} not found", failure_message, id);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        None => {
            error!("{}: {:#}", failure_message, e);
            (StatusCode::INTERNAL_SERVER_ERROR, failure_message.to_string()).into_response()
        }
    }
}

/// List expenses, newest first, with the total of the filtered set
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseFilterRequest>,
) -> impl IntoResponse {
    info!("GET /api/expenses - query: {:?}", query);

    let filter = ExpenseMapper::to_filter(query);
    match state.expense_service.list_expenses(&filter).await {
        Ok(result) => {
            let response = ExpenseListResponse {
                count: result.expenses.len(),
                expenses: ExpenseMapper::to_dtos(&result.expenses, &state.bucketer),
                total: result.total,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to load expenses"),
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses - request: {:?}", request);

    let command = ExpenseMapper::to_create_command(request);
    match state.expense_service.create_expense(command).await {
        Ok(expense) => {
            let success_message = state
                .expense_form_service
                .generate_success_message(&expense.description, expense.amount);
            let response = CreateExpenseResponse {
                expense: ExpenseMapper::to_dto(&expense, &state.bucketer),
                success_message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to add expense"),
    }
}

/// Validate entry form input without writing anything
pub async fn validate_expense(
    State(state): State<AppState>,
    Json(request): Json<ValidateExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses/validate - request: {:?}", request);

    let validation = state.expense_form_service.validate_expense_form(
        &request.description,
        &request.amount_input,
        &request.paid_by,
        &request.category,
    );
    (StatusCode::OK, Json(validation)).into_response()
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/expenses/{}", id);

    match state.expense_service.get_expense(&id).await {
        Ok(Some(expense)) => {
            (StatusCode::OK, Json(ExpenseMapper::to_dto(&expense, &state.bucketer))).into_response()
        }
        Ok(None) => error_response(ExpenseError::NotFound(id).into(), "Failed to load expense"),
        Err(e) => error_response(e, "Failed to load expense"),
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{} - request: {:?}", id, request);

    let changes = ExpenseMapper::to_changes(request);
    match state.expense_service.update_expense(&id, changes).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseMapper::to_dto(&expense, &state.bucketer))).into_response(),
        Err(e) => error_response(e, "Failed to update expense"),
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", id);

    match state.expense_service.delete_expense(&id).await {
        Ok(result) => {
            let response = DeleteExpenseResponse {
                id: result.id,
                deleted: result.deleted,
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to delete expense"),
    }
}
