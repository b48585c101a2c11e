//! Client for the fan hub's own backend.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{check_status, read_json, session::SessionData, ClientError, Session};
use crate::{
    auth::{
        dto::{AuthResponse, ExistsResponse, LoginRequest, PublicUser, RegisterRequest},
        Role,
    },
    comments::repo_types::Comment,
    ratings::{dto::AverageRating, repo_types::Rating},
    users::dto::{DeletedResponse, UpdateProfileRequest, UserPage, UserQuery},
};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Builds `{base}/{segment}/{segment}...`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.client.request(method, self.url(segments)?))
    }

    /// Sends with the session token when there is one. A 401 on a call that
    /// carried a token means it expired or was revoked: the session is cleared.
    async fn send_authed(&self, rb: RequestBuilder) -> Result<Response, ClientError> {
        let token = self.session.token();
        let rb = match &token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        };
        let res = rb.send().await?;
        match check_status(res).await {
            Err(ClientError::Unauthorized(body)) if token.is_some() => {
                warn!("token rejected by server; logging out");
                self.session.clear()?;
                Err(ClientError::Unauthorized(body))
            }
            other => other,
        }
    }

    async fn authed_json<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ClientError> {
        let res = self.send_authed(rb).await?;
        read_json(res).await
    }

    // --- public endpoints ---

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: &RegisterRequest) -> Result<PublicUser, ClientError> {
        let res = self
            .request(Method::POST, &["auth", "register"])?
            .json(req)
            .send()
            .await?;
        read_json(res).await
    }

    /// Logs in and stores the token and identity in the session.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let res = self
            .request(Method::POST, &["auth", "login"])?
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = read_json(res).await?;
        self.session.write(SessionData {
            token: auth.token.clone(),
            username: auth.user.username.clone(),
            role: Some(auth.user.role),
        })?;
        info!(username = %auth.user.username, "logged in");
        Ok(auth)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, ClientError> {
        let res = self
            .request(Method::GET, &["auth", "exists", "username", username])?
            .send()
            .await?;
        Ok(read_json::<ExistsResponse>(res).await?.exists)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, ClientError> {
        let res = self
            .request(Method::GET, &["auth", "exists", "email", email])?
            .send()
            .await?;
        Ok(read_json::<ExistsResponse>(res).await?.exists)
    }

    // --- profile ---

    pub async fn profile(&self) -> Result<PublicUser, ClientError> {
        self.authed_json(self.request(Method::GET, &["me"])?).await
    }

    pub async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<PublicUser, ClientError> {
        self.authed_json(self.request(Method::PUT, &["me"])?.json(req))
            .await
    }

    /// Deletes the account and ends the session.
    pub async fn delete_profile(&self) -> Result<DeletedResponse, ClientError> {
        let deleted = self
            .authed_json(self.request(Method::DELETE, &["me"])?)
            .await?;
        self.session.clear()?;
        Ok(deleted)
    }

    // --- admin ---

    pub async fn list_users(&self, query: &UserQuery) -> Result<UserPage, ClientError> {
        self.authed_json(self.request(Method::GET, &["admin", "users"])?.query(query))
            .await
    }

    pub async fn change_role(&self, id: Uuid, role: Role) -> Result<PublicUser, ClientError> {
        let id = id.to_string();
        self.authed_json(
            self.request(Method::PUT, &["admin", "users", &id, "role"])?
                .json(&json!({ "role": role })),
        )
        .await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<DeletedResponse, ClientError> {
        let id = id.to_string();
        self.authed_json(self.request(Method::DELETE, &["admin", "users", &id])?)
            .await
    }

    pub async fn delete_users(&self, ids: &[Uuid]) -> Result<DeletedResponse, ClientError> {
        self.authed_json(
            self.request(Method::POST, &["admin", "users", "delete"])?
                .json(&json!({ "ids": ids })),
        )
        .await
    }

    // --- favorites ---

    pub async fn add_favorite(&self, character_id: i32) -> Result<(), ClientError> {
        let id = character_id.to_string();
        self.send_authed(self.request(Method::POST, &["favorites", &id])?)
            .await?;
        Ok(())
    }

    pub async fn remove_favorite(&self, character_id: i32) -> Result<(), ClientError> {
        let id = character_id.to_string();
        self.send_authed(self.request(Method::DELETE, &["favorites", &id])?)
            .await?;
        Ok(())
    }

    /// Empty without a session; no request is made.
    pub async fn favorite_ids(&self) -> Result<Vec<i32>, ClientError> {
        if self.session.token().is_none() {
            return Ok(Vec::new());
        }
        self.authed_json(self.request(Method::GET, &["favorites"])?)
            .await
    }

    // --- comments ---

    pub async fn comments_for_episode(&self, episode_id: i32) -> Result<Vec<Comment>, ClientError> {
        let ep = episode_id.to_string();
        self.authed_json(self.request(Method::GET, &["episodes", &ep, "comments"])?)
            .await
    }

    pub async fn add_comment(&self, episode_id: i32, text: &str) -> Result<Comment, ClientError> {
        let ep = episode_id.to_string();
        self.authed_json(
            self.request(Method::POST, &["episodes", &ep, "comments"])?
                .json(&json!({ "text": text })),
        )
        .await
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send_authed(self.request(Method::DELETE, &["comments", &id])?)
            .await?;
        Ok(())
    }

    // --- ratings ---

    pub async fn rate_episode(&self, episode_id: i32, value: i16) -> Result<Rating, ClientError> {
        let ep = episode_id.to_string();
        self.authed_json(
            self.request(Method::PUT, &["episodes", &ep, "rating"])?
                .json(&json!({ "value": value })),
        )
        .await
    }

    pub async fn my_rating(&self, episode_id: i32) -> Result<Option<Rating>, ClientError> {
        let ep = episode_id.to_string();
        self.authed_json(self.request(Method::GET, &["episodes", &ep, "rating"])?)
            .await
    }

    pub async fn average_rating(&self, episode_id: i32) -> Result<AverageRating, ClientError> {
        let ep = episode_id.to_string();
        self.authed_json(self.request(Method::GET, &["episodes", &ep, "rating", "average"])?)
            .await
    }

    // --- viewed episodes ---

    pub async fn mark_viewed(&self, episode_id: i32) -> Result<(), ClientError> {
        let ep = episode_id.to_string();
        self.send_authed(self.request(Method::POST, &["viewed", &ep])?)
            .await?;
        Ok(())
    }

    pub async fn unmark_viewed(&self, episode_id: i32) -> Result<(), ClientError> {
        let ep = episode_id.to_string();
        self.send_authed(self.request(Method::DELETE, &["viewed", &ep])?)
            .await?;
        Ok(())
    }

    pub async fn viewed_episodes(&self) -> Result<Vec<i32>, ClientError> {
        self.authed_json(self.request(Method::GET, &["viewed"])?)
            .await
    }
}
