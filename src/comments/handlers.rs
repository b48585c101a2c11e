use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::NewCommentRequest, repo, repo_types::Comment};
use crate::{
    auth::AuthUser,
    error::{positive_id, AppError, AppResult},
    extract::{Json, Path},
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/episodes/:episode_id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/comments/:id", delete(delete_comment))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(episode_id): Path<i32>,
) -> AppResult<Json<Vec<Comment>>> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    Ok(Json(repo::list_by_episode(&state.db, episode_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(episode_id): Path<i32>,
    Json(payload): Json<NewCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    let text = payload.validated_text()?;
    let comment = repo::insert(&state.db, episode_id, user.id, &text).await?;
    info!(user_id = %user.id, episode_id, comment_id = %comment.id, "comment added");
    Ok((StatusCode::CREATED, Json(comment)))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    // Someone else's comment looks the same as a missing one.
    if repo::delete_owned(&state.db, id, user.id).await? == 0 {
        return Err(AppError::NotFound("Comentario no encontrado".into()));
    }
    info!(user_id = %user.id, comment_id = %id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
