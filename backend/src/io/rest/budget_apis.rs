//! # REST API for Monthly Budgets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use shared::{BudgetListResponse, SaveBudgetRequest, SaveBudgetResponse};
use tracing::{error, info, warn};

use crate::domain::commands::budgets::SaveBudgetCommand;
use crate::domain::date_bucket::MonthKey;
use crate::domain::filter::ExpenseFilter;
use crate::domain::models::budget::BudgetError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets))
        .route("/budgets/:month_key", get(get_budget).put(save_budget))
}

fn parse_month_key(raw: &str) -> Result<MonthKey, Response> {
    raw.parse::<MonthKey>().map_err(|e| {
        warn!("Rejected month key '{}': {}", raw, e);
        (StatusCode::BAD_REQUEST, e.to_string()).into_response()
    })
}

/// Every saved budget with its month's spending
pub async fn list_budgets(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/budgets");

    let statuses = match state.expense_service.all_expenses().await {
        Ok(expenses) => {
            state
                .budget_service
                .budget_statuses(&expenses, &state.bucketer)
                .await
        }
        Err(e) => Err(e),
    };

    match statuses {
        Ok(budgets) => (StatusCode::OK, Json(BudgetListResponse { budgets })).into_response(),
        Err(e) => {
            error!("Failed to list budgets: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load budgets").into_response()
        }
    }
}

/// Budget status for a month: amount, spent, percent used and band
pub async fn get_budget(
    State(state): State<AppState>,
    Path(month_key): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/budgets/{}", month_key);

    let month_key = match parse_month_key(&month_key) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let status = match state
        .expense_service
        .list_expenses(&ExpenseFilter::for_month(month_key))
        .await
    {
        Ok(result) => {
            state
                .budget_service
                .budget_status(month_key, &result.expenses)
                .await
        }
        Err(e) => Err(e),
    };

    match status {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => {
            error!("Failed to load budget for {}: {:#}", month_key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load budget").into_response()
        }
    }
}

pub async fn save_budget(
    State(state): State<AppState>,
    Path(month_key): Path<String>,
    Json(request): Json<SaveBudgetRequest>,
) -> impl IntoResponse {
    info!("PUT /api/budgets/{} - request: {:?}", month_key, request);

    let month_key = match parse_month_key(&month_key) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let command = SaveBudgetCommand {
        month_key,
        amount: request.amount,
    };
    if let Err(e) = state.budget_service.save_budget(command).await {
        if let Some(budget_error) = e.downcast_ref::<BudgetError>() {
            return (StatusCode::BAD_REQUEST, budget_error.to_string()).into_response();
        }
        error!("Failed to save budget for {}: {:#}", month_key, e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save budget").into_response();
    }

    let status = match state
        .expense_service
        .list_expenses(&ExpenseFilter::for_month(month_key))
        .await
    {
        Ok(result) => {
            state
                .budget_service
                .budget_status(month_key, &result.expenses)
                .await
        }
        Err(e) => Err(e),
    };

    match status {
        Ok(status) => {
            let response = SaveBudgetResponse {
                success_message: format!(
                    "Budget for {} {} saved",
                    month_key.month_name(),
                    month_key.year()
                ),
                status,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Saved budget for {} but failed to reload it: {:#}", month_key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load budget").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::expenses::CreateExpenseCommand;
    use crate::io::rest::test_utils::{body_json, json_request, TestApp};
    use axum::body::Body;
    use axum::http::Request;
    use shared::{BudgetBand, BudgetStatus};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_get_budget_without_saved_budget() {
        let app = TestApp::new();

        let response = get_budget(State(app.state.clone()), Path("2025-07".to_string()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let status: BudgetStatus = body_json(response).await;
        assert_eq!(status.budget, None);
        assert_eq!(status.percent_used, 0);
        assert_eq!(status.band, BudgetBand::Safe);
    }

    #[tokio::test]
    async fn test_save_then_get_budget() {
        let app = TestApp::new();
        app.state
            .expense_service
            .create_expense(CreateExpenseCommand {
                amount: 4000.0,
                description: "Monthly groceries".to_string(),
                paid_by: "Rajat".to_string(),
                category: "Groceries".to_string(),
                date: Some("2025-07-05".to_string()),
            })
            .await
            .unwrap();
        let router = app.router();

        let response = router
            .clone()
            .oneshot(json_request("PUT", "/api/budgets/2025-07", &SaveBudgetRequest { amount: 5000.0 }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved: SaveBudgetResponse = body_json(response).await;
        assert_eq!(saved.success_message, "Budget for July 2025 saved");
        assert_eq!(saved.status.percent_used, 80);
        assert_eq!(saved.status.band, BudgetBand::Critical);
        assert_eq!(saved.status.color, "#e53935");

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/budgets/2025-07")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status: BudgetStatus = body_json(response).await;
        assert_eq!(status.budget, Some(5000.0));
        assert_eq!(status.spent, 4000.0);
    }

    #[tokio::test]
    async fn test_list_budgets_handler() {
        let app = TestApp::new();
        let router = app.router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/budgets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let empty: BudgetListResponse = body_json(response).await;
        assert!(empty.budgets.is_empty());

        for month in ["2025-09", "2025-07"] {
            let uri = format!("/api/budgets/{}", month);
            let response = router
                .clone()
                .oneshot(json_request("PUT", &uri, &SaveBudgetRequest { amount: 300.0 }))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = list_budgets(State(app.state.clone())).await.into_response();
        let listed: BudgetListResponse = body_json(response).await;
        let months: Vec<&str> = listed.budgets.iter().map(|b| b.month_key.as_str()).collect();
        assert_eq!(months, vec!["2025-07", "2025-09"]);
        assert!(listed.budgets.iter().all(|b| b.budget == Some(300.0)));
    }

    #[tokio::test]
    async fn test_malformed_month_key_is_bad_request() {
        let app = TestApp::new();

        let response = get_budget(State(app.state.clone()), Path("July".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = save_budget(
            State(app.state.clone()),
            Path("2025-13".to_string()),
            Json(SaveBudgetRequest { amount: 10.0 }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_negative_budget_is_bad_request() {
        let app = TestApp::new();

        let response = save_budget(
            State(app.state.clone()),
            Path("2025-07".to_string()),
            Json(SaveBudgetRequest { amount: -5.0 }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.state.budget_service.list_budgets().await.unwrap().is_empty());
    }
}
