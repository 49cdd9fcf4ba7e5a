//! # Expense Tracker Backend
//!
//! Shared household expense tracking: record who paid for what, filter and
//! chart the list, and watch spending against a monthly budget.
//!
//! ## Architecture
//!
//! - **Storage** ([`storage`]): expenses in CSV, budgets in YAML, a change feed
//! - **Domain** ([`domain`]): date bucketing, filtering, aggregation, services
//! - **IO** ([`io`]): REST handlers, mappers and the live event stream
//! - **Config** ([`config`]): YAML file plus environment overrides

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use config::AppConfig;
use domain::{
    AuthService, BudgetService, DashboardService, DateBucketer, ExpenseFormService,
    ExpenseService, ExpenseTableService,
};
use storage::CsvConnection;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bucketer: DateBucketer,
    pub expense_service: ExpenseService<CsvConnection>,
    pub expense_form_service: ExpenseFormService,
    pub expense_table_service: ExpenseTableService,
    pub budget_service: BudgetService<CsvConnection>,
    pub dashboard_service: DashboardService<CsvConnection>,
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(config: AppConfig, connection: CsvConnection) -> Result<Self> {
        let bucketer = config.bucketer()?;
        let form_config = config.form_config();
        let connection = Arc::new(connection);

        let expense_form_service = ExpenseFormService::with_config(form_config.clone());
        let expense_service = ExpenseService::new(
            connection.clone(),
            expense_form_service.clone(),
            bucketer.clone(),
        );
        let expense_table_service = ExpenseTableService::new(form_config, bucketer.clone());
        let budget_service = BudgetService::new(connection);
        let dashboard_service = DashboardService::new(expense_service.clone(), budget_service.clone());

        let auth_service = config.auth_service();

        Ok(Self {
            config: Arc::new(config),
            bucketer,
            expense_service,
            expense_form_service,
            expense_table_service,
            budget_service,
            dashboard_service,
            auth_service,
        })
    }
}

/// Open storage in the configured data directory and wire up the services
pub fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Using data directory {}", config.storage.data_dir.display());
    let connection = CsvConnection::new(&config.storage.data_dir)?;
    AppState::new(config, connection)
}

pub fn create_router(state: AppState) -> Result<Router> {
    let allow_origin = match &state.config.server.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.parse::<HeaderValue>()?),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = io::rest::api_router(&state);

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}
