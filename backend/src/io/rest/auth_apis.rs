//! # REST API for Anonymous Sessions
//!
//! `POST /api/auth/anonymous` issues a session uid. When
//! `auth.require_session` is enabled, [`require_session`] guards every other
//! API route. The live feed also takes the uid as `?uid=`, since browser
//! event sources cannot set headers.

use axum::{
    extract::{Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use chrono::SecondsFormat;
use serde::Deserialize;
use shared::AnonymousSignInResponse;
use tracing::{info, warn};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/anonymous", post(sign_in_anonymously))
}

pub async fn sign_in_anonymously(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/auth/anonymous");

    let session = state.auth_service.sign_in_anonymously().await;
    let response = AnonymousSignInResponse {
        uid: session.uid,
        created_at: session.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

fn bearer_uid(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    uid: Option<String>,
}

fn live_query_uid(request: &Request) -> Option<String> {
    if !request.uri().path().ends_with("/live") {
        return None;
    }
    let Query(query) = Query::<SessionQuery>::try_from_uri(request.uri()).ok()?;
    query.uid.filter(|uid| !uid.trim().is_empty())
}

/// Rejects requests without a known session uid when sessions are required
pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.auth.require_session {
        return next.run(request).await;
    }

    let uid = bearer_uid(&request)
        .map(str::to_string)
        .or_else(|| live_query_uid(&request));
    let authorized = match uid {
        Some(uid) => state.auth_service.is_valid_session(&uid).await,
        None => false,
    };

    if authorized {
        next.run(request).await
    } else {
        warn!("Rejected {} {} without a valid session", request.method(), request.uri());
        (StatusCode::UNAUTHORIZED, "A valid session is required").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::io::rest::test_utils::{body_json, TestApp};
    use axum::body::Body;
    use tower::ServiceExt;

    fn get(uri: &str, uid: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(uid) = uid {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", uid));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn sign_in() -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/auth/anonymous")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_sessions_not_required_by_default() {
        let app = TestApp::new();

        let response = app.router().oneshot(get("/api/expenses", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_required_session_flow() {
        let mut config = AppConfig::default();
        config.auth.require_session = true;
        let app = TestApp::with_config(config);
        let router = app.router();

        let response = router.clone().oneshot(get("/api/expenses", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(get("/api/expenses", Some("made-up")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router.clone().oneshot(sign_in()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let session: AnonymousSignInResponse = body_json(response).await;

        let response = router
            .oneshot(get("/api/expenses", Some(&session.uid)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_live_feed_accepts_uid_query() {
        let mut config = AppConfig::default();
        config.auth.require_session = true;
        let app = TestApp::with_config(config);
        let router = app.router();

        let session = app.state.auth_service.sign_in_anonymously().await;

        let response = router.clone().oneshot(get("/api/live", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(get("/api/live?uid=made-up", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let uri = format!("/api/live?uid={}", session.uid);
        let response = router.clone().oneshot(get(&uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // other routes still need the header
        let uri = format!("/api/expenses?uid={}", session.uid);
        let response = router.oneshot(get(&uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
