//! Client side of the fan hub: the persisted session, the upstream catalogue
//! client and the client for our own backend.

pub mod api;
pub mod remote;
pub mod remote_types;
pub mod session;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;

pub use api::ApiClient;
pub use remote::RemoteClient;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionData, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// Message suitable for an inline notification. Uses the server's
    /// `{"error": "..."}` body when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { body, .. } | ClientError::Unauthorized(body) => {
                error_field(body).unwrap_or_else(|| "No se pudo completar la solicitud".into())
            }
            ClientError::Transport(_)
            | ClientError::Decode(_)
            | ClientError::InvalidUrl(_)
            | ClientError::Storage(_) => {
                "Error de conexión, inténtalo de nuevo".into()
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

/// Everything a client front end needs, built from one config.
#[derive(Clone)]
pub struct Clients {
    pub remote: RemoteClient,
    pub api: ApiClient,
    pub session: Arc<Session>,
    pub page_size: u32,
}

impl Clients {
    /// Restores the session from `session_file` and points both clients at
    /// their base URLs.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let session = Arc::new(Session::open(FileSessionStore::new(&config.session_file))?);
        Ok(Self {
            remote: RemoteClient::new(&config.upstream_base_url),
            api: ApiClient::new(&config.api_base_url, session.clone()),
            session,
            page_size: config.page_size,
        })
    }
}

fn error_field(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

/// Turns a response into `T`, or into an error for any non-2xx status.
pub(crate) async fn read_json<T: DeserializeOwned>(
    res: reqwest::Response,
) -> Result<T, ClientError> {
    let res = check_status(res).await?;
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

pub(crate) async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized(body));
    }
    Err(ClientError::Status { status, body })
}
