//! Helpers for handler tests: an [`AppState`] over a temporary data
//! directory and body decoding.

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request};
use axum::response::Response;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::storage::csv::test_utils::TestEnvironment;
use crate::{create_router, AppState};

pub struct TestApp {
    pub state: AppState,
    _env: TestEnvironment,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let env = TestEnvironment::new().unwrap();
        let state = AppState::new(config, env.connection.clone()).unwrap();
        Self { state, _env: env }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone()).unwrap()
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let text = body_text(response).await;
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON body {:?}: {}", text, e))
}

pub fn json_request<T: Serialize>(method: &str, uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}
