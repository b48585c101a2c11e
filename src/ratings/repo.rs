use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Rating;

pub async fn upsert(db: &PgPool, user_id: Uuid, episode_id: i32, value: i16) -> sqlx::Result<Rating> {
    sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (user_id, episode_id, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, episode_id)
        DO UPDATE SET value = EXCLUDED.value, updated_at = now()
        RETURNING user_id, episode_id, value, updated_at
        "#,
    )
    .bind(user_id)
    .bind(episode_id)
    .bind(value)
    .fetch_one(db)
    .await
}

pub async fn find(db: &PgPool, user_id: Uuid, episode_id: i32) -> sqlx::Result<Option<Rating>> {
    sqlx::query_as::<_, Rating>(
        r#"
        SELECT user_id, episode_id, value, updated_at
          FROM ratings
         WHERE user_id = $1 AND episode_id = $2
        "#,
    )
    .bind(user_id)
    .bind(episode_id)
    .fetch_optional(db)
    .await
}

/// `(average, count)`; the average is 0 when nobody rated the episode.
pub async fn average(db: &PgPool, episode_id: i32) -> sqlx::Result<(f64, i64)> {
    sqlx::query_as::<_, (f64, i64)>(
        r#"
        SELECT COALESCE(AVG(value)::float8, 0), COUNT(*)
          FROM ratings
         WHERE episode_id = $1
        "#,
    )
    .bind(episode_id)
    .fetch_one(db)
    .await
}
