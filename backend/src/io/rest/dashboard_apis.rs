use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::DashboardRequest;
use tracing::{error, info};

use crate::domain::date_bucket::MonthKey;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// Month dashboard; `?month=YYYY-MM`, the current month when omitted
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardRequest>,
) -> impl IntoResponse {
    info!("GET /api/dashboard - query: {:?}", query);

    let month = match query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => match raw.parse::<MonthKey>() {
            Ok(key) => Some(key),
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        },
        None => None,
    };

    match state.dashboard_service.month_view(month).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            error!("Failed to build dashboard: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load dashboard").into_response()
        }
    }
}
