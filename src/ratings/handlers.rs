use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use super::{
    dto::{AverageRating, RateRequest},
    repo,
    repo_types::Rating,
};
use crate::{
    auth::AuthUser,
    error::{positive_id, AppResult},
    extract::{Json, Path},
    state::AppState,
};

pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/episodes/:episode_id/rating",
            get(my_rating).put(rate_episode),
        )
        .route("/episodes/:episode_id/rating/average", get(average_rating))
}

#[instrument(skip(state))]
pub async fn rate_episode(
    State(state): State<AppState>,
    user: AuthUser,
    Path(episode_id): Path<i32>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<Rating>> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    let value = payload.validated()?;
    let rating = repo::upsert(&state.db, user.id, episode_id, value).await?;
    info!(user_id = %user.id, episode_id, value, "episode rated");
    Ok(Json(rating))
}

/// `null` when the caller has not rated the episode.
#[instrument(skip(state))]
pub async fn my_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(episode_id): Path<i32>,
) -> AppResult<Json<Option<Rating>>> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    Ok(Json(repo::find(&state.db, user.id, episode_id).await?))
}

#[instrument(skip(state))]
pub async fn average_rating(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(episode_id): Path<i32>,
) -> AppResult<Json<AverageRating>> {
    let episode_id = positive_id(episode_id, "episode_id")?;
    let (average, count) = repo::average(&state.db, episode_id).await?;
    Ok(Json(AverageRating {
        episode_id,
        average,
        count,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{send, token};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let token = token();
        for value in [0, 6] {
            let (status, _) = send(
                Method::PUT,
                "/api/v1/episodes/1/rating",
                Some(&token),
                Some(json!({ "value": value })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn mistyped_rating_is_a_validation_error() {
        let (status, body) = send(
            Method::PUT,
            "/api/v1/episodes/1/rating",
            Some(&token()),
            Some(json!({ "value": "five" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Cuerpo inválido"));
    }

    #[tokio::test]
    async fn average_requires_a_token() {
        let (status, _) = send(Method::GET, "/api/v1/episodes/1/rating/average", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
