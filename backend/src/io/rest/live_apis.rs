//! # Live Change Feed
//!
//! Server-sent events for clients that keep their views in sync. The stream
//! opens with a `ready` event, then sends one `change` event per committed
//! write. A client that fell behind receives `resync` and should re-read.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use std::convert::Infallible;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/live", get(live_changes))
}

pub async fn live_changes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("GET /api/live - subscriber connected");

    let ready = tokio_stream::once(Ok(Event::default().event("ready").data("ok")));
    let changes = BroadcastStream::new(state.expense_service.subscribe()).map(|message| {
        let event = match message {
            Ok(change) => match Event::default().event("change").json_data(&change) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Could not encode change {:?}: {}", change, e);
                    Event::default().event("resync").data("0")
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Live subscriber lagged, {} changes skipped", skipped);
                Event::default().event("resync").data(skipped.to_string())
            }
        };
        Ok(event)
    });

    Sse::new(ready.chain(changes)).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use crate::domain::commands::expenses::CreateExpenseCommand;
    use crate::io::rest::test_utils::TestApp;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use std::time::Duration;
    use tokio_stream::StreamExt;
    use tower::ServiceExt;

    async fn next_frame(stream: &mut axum::body::BodyDataStream) -> String {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .expect("body error");
        String::from_utf8(chunk.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_live_stream_sends_ready_then_changes() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(Request::builder().uri("/api/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");

        let mut stream = response.into_body().into_data_stream();
        let ready = next_frame(&mut stream).await;
        assert!(ready.contains("event: ready"));

        let expense = app
            .state
            .expense_service
            .create_expense(CreateExpenseCommand {
                amount: 75.0,
                description: "Paneer".to_string(),
                paid_by: "Rahul".to_string(),
                category: "Groceries".to_string(),
                date: None,
            })
            .await
            .unwrap();

        let change = next_frame(&mut stream).await;
        assert!(change.contains("event: change"));
        assert!(change.contains(&expense.id));
        assert!(change.contains("\"kind\":\"created\""));
    }
}
