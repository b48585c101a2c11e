//! Drop-in replacements for axum's `Json`, `Path` and `Query` whose
//! rejections go through `AppError`, so a malformed request gets a 400 with
//! the usual `{"error": "..."}` body.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

fn rejected(kind: &'static str, message: String, detail: String) -> AppError {
    warn!(kind, %detail, "request rejected");
    AppError::Validation(message)
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Se esperaba un cuerpo application/json".to_string()
            }
            JsonRejection::JsonSyntaxError(_) => "JSON mal formado".to_string(),
            JsonRejection::JsonDataError(_) => {
                format!("Cuerpo inválido: {}", strip_axum_prefix(&detail))
            }
            _ => "Cuerpo de la solicitud inválido".to_string(),
        };
        rejected("json", message, detail)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let detail = rejection.body_text();
        rejected("path", "Parámetro de ruta inválido".to_string(), detail)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let detail = rejection.body_text();
        let message = format!("Parámetros de consulta inválidos: {}", strip_axum_prefix(&detail));
        rejected("query", message, detail)
    }
}

/// axum prefixes serde's message with its own sentence; keep serde's part.
fn strip_axum_prefix(detail: &str) -> &str {
    detail.split_once(": ").map_or(detail, |(_, tail)| tail)
}

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_detail_is_kept() {
        assert_eq!(
            strip_axum_prefix(
                "Failed to deserialize query string: unknown variant `age`, expected one of `username`"
            ),
            "unknown variant `age`, expected one of `username`"
        );
        assert_eq!(
            strip_axum_prefix(
                "Failed to deserialize the JSON body into the target type: missing field `email` at line 1 column 20"
            ),
            "missing field `email` at line 1 column 20"
        );
        assert_eq!(strip_axum_prefix("plain"), "plain");
    }
}
