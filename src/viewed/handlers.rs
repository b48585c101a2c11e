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

pub fn viewed_routes() -> Router<AppState> {
    Router::new()
        .route("/viewed", get(list_viewed))
        .route("/viewed/:episode_id", post(mark_viewed).delete(unmark_viewed))
}

#[instrument(skip(state))]
pub async fn list_viewed(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<i32>>> {
    Ok(Json(repo::list(&state.db, user.id).await?))
}

#[instrument(skip(state))]
pub async fn mark_viewed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(episode_id): Path<i32>,
) -> AppResult<StatusCode> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    repo::mark(&state.db, user.id, episode_id).await?;
    info!(user_id = %user.id, episode_id, "episode marked viewed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn unmark_viewed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(episode_id): Path<i32>,
) -> AppResult<StatusCode> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    if repo::unmark(&state.db, user.id, episode_id).await? == 0 {
        return Err(AppError::NotFound("Episodio no marcado como visto".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::testing::{send, token};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn viewed_requires_a_token() {
        let (status, _) = send(Method::POST, "/api/v1/viewed/3", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn episode_id_must_be_positive() {
        let (status, body) = send(Method::POST, "/api/v1/viewed/0", Some(&token()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "episode_id inválido");
    }
}
