//! Router helpers for handler tests. Requests go through the full app
//! against `AppState::fake()`, so only paths that finish before the
//! database is reached can succeed.

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{app::build_app, auth::jwt::JwtKeys, state::AppState};

/// A token the fake state accepts.
pub fn token() -> String {
    JwtKeys::from_ref(&AppState::fake())
        .sign(Uuid::new_v4(), "rick")
        .unwrap()
}

pub async fn send(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = match body {
        Some(json) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let res = build_app(AppState::fake())
        .oneshot(req.body(body).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
