use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventLike {
    pub event_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeCount {
    pub likes: i64,
}

/// 点赞切换的结果
#[derive(Debug)]
pub enum ToggleOutcome {
    Liked(EventLike),
    Unliked,
}

impl EventLike {
    pub async fn count(pool: &PgPool, event_id: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_likes WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// 已点赞则取消，否则新增；并发重复点赞由主键冲突吸收
    pub async fn toggle(
        pool: &PgPool,
        event_id: i32,
        user_id: i32,
    ) -> Result<ToggleOutcome, sqlx::Error> {
        let removed = sqlx::query("DELETE FROM event_likes WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        if removed.rows_affected() > 0 {
            return Ok(ToggleOutcome::Unliked);
        }

        let like = sqlx::query_as::<_, EventLike>(
            r#"
            INSERT INTO event_likes (event_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (event_id, user_id) DO UPDATE SET created_at = event_likes.created_at
            RETURNING event_id, user_id, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(ToggleOutcome::Liked(like))
    }
}
