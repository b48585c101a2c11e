use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        total_pages, ChangeRoleRequest, DeleteUsersRequest, DeletedResponse,
        UpdateProfileRequest, UserPage, UserQuery, MAX_PAGE_SIZE,
    },
    repo::{self, ProfileUpdate},
};
use crate::{
    auth::{
        dto::PublicUser,
        services::{is_valid_email, normalize_email, validate_birth_date, validate_name},
        AuthUser, RequireAdmin, Role, User,
    },
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me).delete(delete_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/delete", post(delete_users))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/users/:id/role", put(change_role))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<PublicUser>> {
    let found = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;
    Ok(Json(found.into()))
}

pub fn validate_profile(req: UpdateProfileRequest, today: time::Date) -> AppResult<ProfileUpdate> {
    let first_name = validate_name("first_name", &req.first_name)?;
    let last_name = validate_name("last_name", &req.last_name)?;
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Email inválido"));
    }
    validate_birth_date(req.birth_date, today)?;
    Ok(ProfileUpdate {
        first_name,
        last_name,
        email,
        birth_date: req.birth_date,
    })
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    let update = validate_profile(payload, OffsetDateTime::now_utc().date())?;
    let updated = repo::update_profile(&state.db, user.id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DeletedResponse>> {
    let deleted = repo::delete_user(&state.db, user.id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Usuario no encontrado".into()));
    }
    info!(user_id = %user.id, "account deleted");
    Ok(Json(DeletedResponse { deleted }))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<UserPage>> {
    if query.page == 0 {
        return Err(AppError::validation("page empieza en 1"));
    }
    if query.page_size == 0 || query.page_size > MAX_PAGE_SIZE {
        return Err(AppError::validation(format!(
            "page_size debe estar entre 1 y {MAX_PAGE_SIZE}"
        )));
    }

    let (users, total) = repo::list_users(&state.db, &query).await?;
    Ok(Json(UserPage {
        users: users.into_iter().map(PublicUser::from).collect(),
        page: query.page,
        page_size: query.page_size,
        total,
        total_pages: total_pages(total, query.page_size),
    }))
}

#[instrument(skip(state, admin))]
pub async fn change_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<Json<PublicUser>> {
    if id == admin.id && payload.role != Role::Admin {
        warn!(admin_id = %admin.id, "admin tried to demote self");
        return Err(AppError::Conflict(
            "No puedes quitarte el rol de administrador".into(),
        ));
    }
    let updated = repo::set_role(&state.db, id, payload.role)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;
    info!(admin_id = %admin.id, user_id = %id, role = %payload.role, "role changed");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    if id == admin.id {
        return Err(AppError::Conflict("No puedes eliminar tu propia cuenta aquí".into()));
    }
    let deleted = repo::delete_user(&state.db, id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Usuario no encontrado".into()));
    }
    info!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(Json(DeletedResponse { deleted }))
}

#[instrument(skip(state, admin, payload))]
pub async fn delete_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<DeleteUsersRequest>,
) -> AppResult<Json<DeletedResponse>> {
    if payload.ids.is_empty() {
        return Err(AppError::validation("ids no puede estar vacío"));
    }
    if payload.ids.contains(&admin.id) {
        return Err(AppError::Conflict("No puedes eliminar tu propia cuenta aquí".into()));
    }
    let deleted = repo::delete_users(&state.db, &payload.ids).await?;
    info!(admin_id = %admin.id, requested = payload.ids.len(), deleted, "bulk delete");
    Ok(Json(DeletedResponse { deleted }))
}
