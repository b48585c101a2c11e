use sqlx::PgPool;
use uuid::Uuid;

/// Idempotent: adding an existing favorite is not an error.
pub async fn add(db: &PgPool, user_id: Uuid, character_id: i32) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO favorites (user_id, character_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, character_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(character_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn remove(db: &PgPool, user_id: Uuid, character_id: i32) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND character_id = $2")
        .bind(user_id)
        .bind(character_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_ids(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<i32>> {
    sqlx::query_scalar::<_, i32>(
        "SELECT character_id FROM favorites WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
