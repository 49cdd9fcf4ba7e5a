//! # REST API
//!
//! HTTP handlers grouped by resource. Each module exposes a `router()` that
//! is merged under `/api` by [`crate::create_router`].

pub mod auth_apis;
pub mod budget_apis;
pub mod chart_apis;
pub mod dashboard_apis;
pub mod expense_apis;
pub mod expense_table_apis;
pub mod live_apis;
pub mod logging_apis;
pub mod mappers;

#[cfg(test)]
pub mod test_utils;

use axum::{middleware, Router};

use crate::AppState;

/// All `/api` routes. Everything except sign-in sits behind the session check.
pub fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(expense_apis::router())
        .merge(expense_table_apis::router())
        .merge(chart_apis::router())
        .merge(budget_apis::router())
        .merge(dashboard_apis::router())
        .merge(live_apis::router())
        .merge(logging_apis::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_apis::require_session,
        ))
        .merge(auth_apis::router())
}
