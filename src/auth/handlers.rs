use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, ExistsResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::hash_password,
        repo_types::User,
        services::{check_credentials, normalize_email, validate_registration},
    },
    error::{AppError, AppResult},
    extract::{Json, Path},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/exists/username/:username", get(username_exists))
        .route("/auth/exists/email/:email", get(email_exists))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let today = OffsetDateTime::now_utc().date();
    let (mut new_user, password) = validate_registration(payload, today).map_err(|e| {
        warn!(error = %e, "registration rejected");
        e
    })?;

    new_user.password_hash = hash_password(&password)?;

    let user = User::create(&state.db, &new_user).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation(
            "Usuario y contraseña son obligatorios",
        ));
    }

    let found = User::find_by_username(&state.db, username).await?;
    let user = check_credentials(found, &payload.password).map_err(|e| {
        warn!(username = %username, "login rejected");
        e
    })?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state))]
pub async fn username_exists(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = User::username_exists(&state.db, username.trim()).await?;
    Ok(Json(ExistsResponse { exists }))
}

#[instrument(skip(state))]
pub async fn email_exists(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = User::email_exists(&state.db, &normalize_email(&email)).await?;
    Ok(Json(ExistsResponse { exists }))
}
