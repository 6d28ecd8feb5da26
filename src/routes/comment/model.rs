use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub event_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

const COMMENT_COLUMNS: &str = "id, content, event_id, user_id, created_at";

impl Comment {
    pub async fn create(
        pool: &PgPool,
        event_id: i32,
        user_id: i32,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (content, event_id, user_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(content)
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_event(pool: &PgPool, event_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE event_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_in_event(
        pool: &PgPool,
        event_id: i32,
        comment_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND event_id = $2"
        ))
        .bind(comment_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
