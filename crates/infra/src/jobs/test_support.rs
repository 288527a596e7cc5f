//! Canned GraphQL endpoint for job tests.

use std::sync::{Arc, Mutex};

use axum::http::{StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone)]
pub struct StubReply {
    status: u16,
    body: String,
}

impl StubReply {
    pub fn ok(body: JsonValue) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

pub type Seen = Arc<Mutex<Vec<JsonValue>>>;

/// Serve `reply` for every POST to `/graphql`; returns the endpoint URL.
pub async fn stub_graphql(reply: StubReply) -> String {
    stub_graphql_recording(reply).await.0
}

/// Like `stub_graphql`, also recording each request body.
pub async fn stub_graphql_recording(reply: StubReply) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));

    let recorder = seen.clone();
    let app = Router::new().route(
        "/graphql",
        post(move |Json(body): Json<JsonValue>| {
            let reply = reply.clone();
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(body);
                (
                    StatusCode::from_u16(reply.status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    reply.body,
                )
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/graphql"), seen)
}
