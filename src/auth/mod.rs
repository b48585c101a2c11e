use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use extractors::{AuthUser, RequireAdmin};
pub use repo_types::{Role, User};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
