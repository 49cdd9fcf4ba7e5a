use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::Serialize;
use shared::LogEntry;
use tracing::{debug, error, info, warn};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/logs", post(log_message))
}

/// Forward a client-side log line into the server log
pub async fn log_message(
    State(_state): State<AppState>,
    Json(entry): Json<LogEntry>,
) -> Result<Json<LogResponse>, StatusCode> {
    let component = entry.component.as_deref().unwrap_or("client");
    let message = format!("[{}] {}", component, entry.message);

    match entry.level.to_lowercase().as_str() {
        "debug" => debug!("{}", message),
        "info" => info!("{}", message),
        "warn" | "warning" => warn!("{}", message),
        "error" => error!("{}", message),
        _ => info!("{}", message),
    }

    Ok(Json(LogResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_utils::TestApp;

    #[tokio::test]
    async fn test_log_message_accepts_any_level() {
        let app = TestApp::new();

        for level in ["error", "WARN", "verbose"] {
            let result = log_message(
                State(app.state.clone()),
                Json(LogEntry {
                    level: level.to_string(),
                    message: "Failed to add expense".to_string(),
                    component: Some("entry-form".to_string()),
                }),
            )
            .await
            .unwrap();
            assert!(result.0.success);
        }
    }
}
