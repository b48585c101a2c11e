use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One rating per (user, episode); re-rating overwrites the value.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Rating {
    pub user_id: Uuid,
    pub episode_id: i32,
    pub value: i16,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
