use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Comment;

pub async fn insert(
    db: &PgPool,
    episode_id: i32,
    user_id: Uuid,
    text: &str,
) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(
        r#"
        WITH inserted AS (
            INSERT INTO comments (id, episode_id, user_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, episode_id, user_id, text, created_at
        )
        SELECT i.id, i.episode_id, i.user_id, u.username, i.text, i.created_at
          FROM inserted i
          JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(episode_id)
    .bind(user_id)
    .bind(text)
    .fetch_one(db)
    .await
}

/// Newest first.
pub async fn list_by_episode(db: &PgPool, episode_id: i32) -> sqlx::Result<Vec<Comment>> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT c.id, c.episode_id, c.user_id, u.username, c.text, c.created_at
          FROM comments c
          JOIN users u ON u.id = c.user_id
         WHERE c.episode_id = $1
         ORDER BY c.created_at DESC
        "#,
    )
    .bind(episode_id)
    .fetch_all(db)
    .await
}

/// Deletes only when `user_id` owns the comment.
pub async fn delete_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
