//! The signed-in user's own activity: comments, ratings, viewed episodes and
//! favorite characters. Views go through this trait so they can be driven
//! without a backend.

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::{
    client::{ApiClient, ClientError},
    comments::repo_types::Comment,
    ratings::{dto::AverageRating, repo_types::Rating},
};

#[async_trait]
pub trait FanActivity: Send + Sync {
    async fn comments_for_episode(&self, episode_id: i32) -> Result<Vec<Comment>, ClientError>;
    async fn add_comment(&self, episode_id: i32, text: &str) -> Result<Comment, ClientError>;
    async fn delete_comment(&self, id: Uuid) -> Result<(), ClientError>;

    async fn rate_episode(&self, episode_id: i32, value: i16) -> Result<Rating, ClientError>;
    async fn my_rating(&self, episode_id: i32) -> Result<Option<Rating>, ClientError>;
    async fn average_rating(&self, episode_id: i32) -> Result<AverageRating, ClientError>;

    async fn viewed_episodes(&self) -> Result<Vec<i32>, ClientError>;
    async fn mark_viewed(&self, episode_id: i32) -> Result<(), ClientError>;
    async fn unmark_viewed(&self, episode_id: i32) -> Result<(), ClientError>;

    async fn favorite_ids(&self) -> Result<Vec<i32>, ClientError>;
    async fn add_favorite(&self, character_id: i32) -> Result<(), ClientError>;
    async fn remove_favorite(&self, character_id: i32) -> Result<(), ClientError>;
}

#[async_trait]
impl FanActivity for ApiClient {
    async fn comments_for_episode(&self, episode_id: i32) -> Result<Vec<Comment>, ClientError> {
        ApiClient::comments_for_episode(self, episode_id).await
    }

    async fn add_comment(&self, episode_id: i32, text: &str) -> Result<Comment, ClientError> {
        ApiClient::add_comment(self, episode_id, text).await
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), ClientError> {
        ApiClient::delete_comment(self, id).await
    }

    async fn rate_episode(&self, episode_id: i32, value: i16) -> Result<Rating, ClientError> {
        ApiClient::rate_episode(self, episode_id, value).await
    }

    async fn my_rating(&self, episode_id: i32) -> Result<Option<Rating>, ClientError> {
        ApiClient::my_rating(self, episode_id).await
    }

    async fn average_rating(&self, episode_id: i32) -> Result<AverageRating, ClientError> {
        ApiClient::average_rating(self, episode_id).await
    }

    async fn viewed_episodes(&self) -> Result<Vec<i32>, ClientError> {
        ApiClient::viewed_episodes(self).await
    }

    async fn mark_viewed(&self, episode_id: i32) -> Result<(), ClientError> {
        ApiClient::mark_viewed(self, episode_id).await
    }

    async fn unmark_viewed(&self, episode_id: i32) -> Result<(), ClientError> {
        ApiClient::unmark_viewed(self, episode_id).await
    }

    async fn favorite_ids(&self) -> Result<Vec<i32>, ClientError> {
        ApiClient::favorite_ids(self).await
    }

    async fn add_favorite(&self, character_id: i32) -> Result<(), ClientError> {
        ApiClient::add_favorite(self, character_id).await
    }

    async fn remove_favorite(&self, character_id: i32) -> Result<(), ClientError> {
        ApiClient::remove_favorite(self, character_id).await
    }
}

/// Unwraps `res`, or logs the failure, keeps the first notice and returns
/// `fallback`.
pub(crate) fn settle<T>(
    res: Result<T, ClientError>,
    fallback: T,
    what: &'static str,
    notice: &mut Option<String>,
) -> T {
    match res {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, what, "falling back to default");
            notice.get_or_insert_with(|| e.user_message());
            fallback
        }
    }
}


#[cfg(test)]
pub(crate) fn unreachable_api() -> ApiClient {
    use crate::client::{Session, SessionData};
    use std::sync::Arc;

    let session = Arc::new(Session::in_memory());
    session
        .write(SessionData {
            token: "tok".into(),
            username: "rick".into(),
            role: None,
        })
        .unwrap();
    ApiClient::new("http://127.0.0.1:1/api/v1", session)
}
