use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

use super::dto::UserQuery;
use crate::auth::{repo::USER_COLUMNS, Role, User};

#[derive(Debug, FromRow)]
struct UserListRow {
    #[sqlx(flatten)]
    user: User,
    total: i64,
}

/// Validated profile fields for `PUT /me`.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Date,
}

/// Escapes LIKE wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// One page of users plus the total number of matching rows.
/// A page past the end yields no rows and a total of 0.
pub async fn list_users(db: &PgPool, q: &UserQuery) -> sqlx::Result<(Vec<User>, i64)> {
    let search = q
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    // Sort column and direction come from closed enums, never from user text.
    let sql = format!(
        r#"
        SELECT {USER_COLUMNS}, COUNT(*) OVER() AS total
        FROM users
        WHERE ($1::text IS NULL
               OR username ILIKE $1 OR email ILIKE $1
               OR first_name ILIKE $1 OR last_name ILIKE $1)
          AND ($2::text IS NULL OR role = $2)
        ORDER BY {} {}, id ASC
        LIMIT $3 OFFSET $4
        "#,
        q.sort.as_sql(),
        q.order.as_sql(),
    );

    let rows = sqlx::query_as::<_, UserListRow>(&sql)
        .bind(search)
        .bind(q.role.map(Role::as_str))
        .bind(i64::from(q.page_size))
        .bind(q.offset())
        .fetch_all(db)
        .await?;

    let total = rows.first().map(|r| r.total).unwrap_or(0);
    Ok((rows.into_iter().map(|r| r.user).collect(), total))
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    update: &ProfileUpdate,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
           SET first_name = $2, last_name = $3, email = $4, birth_date = $5
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.email)
    .bind(update.birth_date)
    .fetch_optional(db)
    .await
}

pub async fn set_role(db: &PgPool, id: Uuid, role: Role) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(role.as_str())
    .fetch_optional(db)
    .await
}

pub async fn delete_user(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_users(db: &PgPool, ids: &[Uuid]) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rick"), "%rick%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
