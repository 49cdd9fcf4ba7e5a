//! # REST API for Charts
//!
//! Payer contribution, category breakdown and daily trend series. Each
//! endpoint accepts the same filter query as the expense list.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{ChartResponse, ExpenseFilterRequest, TrendResponse};
use tracing::{error, info};

use super::mappers::ExpenseMapper;
use crate::domain::aggregation::{by_category, by_payer, daily_trend};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/charts/payers", get(get_payer_chart))
        .route("/charts/categories", get(get_category_chart))
        .route("/charts/trend", get(get_trend_chart))
}

pub async fn get_payer_chart(
    State(state): State<AppState>,
    Query(query): Query<ExpenseFilterRequest>,
) -> impl IntoResponse {
    info!("GET /api/charts/payers - query: {:?}", query);

    match state
        .expense_service
        .list_expenses(&ExpenseMapper::to_filter(query))
        .await
    {
        Ok(result) => {
            let response = ChartResponse {
                points: by_payer(&result.expenses),
                total: result.total,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to build payer chart: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load chart").into_response()
        }
    }
}

pub async fn get_category_chart(
    State(state): State<AppState>,
    Query(query): Query<ExpenseFilterRequest>,
) -> impl IntoResponse {
    info!("GET /api/charts/categories - query: {:?}", query);

    match state
        .expense_service
        .list_expenses(&ExpenseMapper::to_filter(query))
        .await
    {
        Ok(result) => {
            let response = ChartResponse {
                points: by_category(&result.expenses),
                total: result.total,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to build category chart: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load chart").into_response()
        }
    }
}

pub async fn get_trend_chart(
    State(state): State<AppState>,
    Query(query): Query<ExpenseFilterRequest>,
) -> impl IntoResponse {
    info!("GET /api/charts/trend - query: {:?}", query);

    match state
        .expense_service
        .list_expenses(&ExpenseMapper::to_filter(query))
        .await
    {
        Ok(result) => {
            let response = TrendResponse {
                points: daily_trend(&result.expenses, &state.bucketer),
                total: result.total,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to build trend chart: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load chart").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::expenses::CreateExpenseCommand;
    use crate::io::rest::test_utils::{body_json, TestApp};

    async fn seed(app: &TestApp) {
        let rows = [
            (120.0, "Nishant", "Groceries", "2025-07-20"),
            (80.0, "Rajat", "Meat", "2025-07-02"),
            (30.0, "Nishant", "Other", "2025-07-01"),
            (60.0, "Rahul", "Groceries", "2025-08-03"),
        ];
        for (amount, payer, category, date) in rows {
            app.state
                .expense_service
                .create_expense(CreateExpenseCommand {
                    amount,
                    description: "item".to_string(),
                    paid_by: payer.to_string(),
                    category: category.to_string(),
                    date: Some(date.to_string()),
                })
                .await
                .unwrap();
        }
    }

    fn july() -> ExpenseFilterRequest {
        ExpenseFilterRequest {
            month_key: Some("2025-07".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_payer_and_category_charts_agree_on_total() {
        let app = TestApp::new();
        seed(&app).await;

        let payers: ChartResponse = body_json(
            get_payer_chart(State(app.state.clone()), Query(july()))
                .await
                .into_response(),
        )
        .await;
        let categories: ChartResponse = body_json(
            get_category_chart(State(app.state.clone()), Query(july()))
                .await
                .into_response(),
        )
        .await;

        assert_eq!(payers.total, 230.0);
        assert_eq!(categories.total, 230.0);
        let payer_sum: f64 = payers.points.iter().map(|p| p.value).sum();
        let category_sum: f64 = categories.points.iter().map(|p| p.value).sum();
        assert_eq!(payer_sum, 230.0);
        assert_eq!(category_sum, 230.0);

        let nishant = payers.points.iter().find(|p| p.name == "Nishant").unwrap();
        assert_eq!(nishant.value, 150.0);
    }

    #[tokio::test]
    async fn test_trend_chart_is_ascending() {
        let app = TestApp::new();
        seed(&app).await;

        let trend: TrendResponse = body_json(
            get_trend_chart(State(app.state.clone()), Query(ExpenseFilterRequest::default()))
                .await
                .into_response(),
        )
        .await;

        let dates: Vec<&str> = trend.points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-07-01", "2025-07-02", "2025-07-20", "2025-08-03"]);
        assert_eq!(trend.total, 290.0);
    }
}
