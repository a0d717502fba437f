//! Liveness endpoint.
//!
//! `/health` answers any method with the request's headers and body
//! wrapped in a success envelope. It says the process is up and nothing
//! more.

use axum::http::HeaderMap;
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::ParlorError;

pub fn router() -> Router {
    Router::new().route("/health", any(health))
}

async fn health(headers: HeaderMap, body: String) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_owned(), Value::from(value)))
        })
        .collect();
    Json(json!({
        "success": true,
        "code": 200,
        "message": "OK",
        "data": {
            "headers": headers,
            "body": body,
        },
    }))
}

/// Binds `addr` and serves [`router`] in a background task.
pub async fn spawn(addr: &str) -> Result<(JoinHandle<()>, std::net::SocketAddr), ParlorError> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "health endpoint listening");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!(error = %e, "health endpoint stopped");
        }
    });
    Ok((handle, local))
}
