use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument};

use super::repo;
use crate::{
    auth::AuthUser,
    error::{positive_id, AppError, AppResult},
    extract::{Json, Path},
    state::AppState,
};

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route(
            "/favorites/:character_id",
            post(add_favorite).delete(remove_favorite),
        )
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<i32>>> {
    Ok(Json(repo::list_ids(&state.db, user.id).await?))
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(character_id): Path<i32>,
) -> AppResult<StatusCode> {
    let character_id = positive_id(character_id, "character_id")?;
    repo::add(&state.db, user.id, character_id).await?;
    info!(user_id = %user.id, character_id, "favorite added");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(character_id): Path<i32>,
) -> AppResult<StatusCode> {
    let character_id = positive_id(character_id, "character_id")?;
    if repo::remove(&state.db, user.id, character_id).await? == 0 {
        return Err(AppError::NotFound("Favorito no encontrado".into()));
    }
    info!(user_id = %user.id, character_id, "favorite removed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::testing::{send, token};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn favorites_require_a_token() {
        let (status, body) = send(Method::GET, "/api/v1/favorites", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_positive_character_id_is_rejected() {
        let token = token();
        let (status, _) = send(Method::POST, "/api/v1/favorites/0", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(Method::DELETE, "/api/v1/favorites/-4", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_character_id_gets_json_error() {
        let (status, body) =
            send(Method::POST, "/api/v1/favorites/abc", Some(&token()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Parámetro de ruta inválido");
    }
}
