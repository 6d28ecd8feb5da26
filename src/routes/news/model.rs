use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNews {
    pub id: i32,
    pub news_name: String,
    pub content: String,
    pub group_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, FromRow)]
struct GroupNewsRow {
    id: i32,
    news_name: String,
    content: String,
    group_id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
    email: String,
}

impl From<GroupNewsRow> for GroupNews {
    fn from(row: GroupNewsRow) -> Self {
        Self {
            id: row.id,
            news_name: row.news_name,
            content: row.content,
            group_id: row.group_id,
            user_id: row.user_id,
            created_at: row.created_at,
            user: UserSummary {
                id: row.user_id,
                email: row.email,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewsRequest {
    pub news_name: Option<String>,
    pub content: Option<String>,
}

const NEWS_SELECT: &str = r#"
    SELECT n.id, n.news_name, n.content, n.group_id, n.user_id, n.created_at, u.email
    FROM group_news n
    JOIN users u ON u.id = n.user_id
"#;

impl GroupNews {
    pub async fn create(
        pool: &PgPool,
        group_id: i32,
        user_id: i32,
        news_name: &str,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, GroupNewsRow>(
            r#"
            WITH inserted AS (
                INSERT INTO group_news (news_name, content, group_id, user_id, created_at)
                VALUES ($1, $2, $3, $4, NOW())
                RETURNING id, news_name, content, group_id, user_id, created_at
            )
            SELECT inserted.*, users.email
            FROM inserted
            JOIN users ON users.id = inserted.user_id
            "#,
        )
        .bind(news_name)
        .bind(content)
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    /// 最新发布的在前
    pub async fn list_by_group(pool: &PgPool, group_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, GroupNewsRow>(&format!(
            "{NEWS_SELECT} WHERE n.group_id = $1 ORDER BY n.created_at DESC, n.id DESC"
        ))
        .bind(group_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(GroupNews::from).collect())
    }

    pub async fn find_in_group(
        pool: &PgPool,
        group_id: i32,
        news_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, GroupNewsRow>(&format!(
            "{NEWS_SELECT} WHERE n.id = $1 AND n.group_id = $2"
        ))
        .bind(news_id)
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(GroupNews::from))
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM group_news WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
