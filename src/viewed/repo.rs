use sqlx::PgPool;
use uuid::Uuid;

pub async fn mark(db: &PgPool, user_id: Uuid, episode_id: i32) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO viewed_episodes (user_id, episode_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, episode_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(episode_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn unmark(db: &PgPool, user_id: Uuid, episode_id: i32) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM viewed_episodes WHERE user_id = $1 AND episode_id = $2")
        .bind(user_id)
        .bind(episode_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<i32>> {
    sqlx::query_scalar::<_, i32>(
        "SELECT episode_id FROM viewed_episodes WHERE user_id = $1 ORDER BY episode_id ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
