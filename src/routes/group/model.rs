use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i32,
    pub group_name: String,
    pub description: Option<String>,
    pub admin_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub group_name: Option<String>,
    pub description: Option<String>,
}

const GROUP_COLUMNS: &str = "id, group_name, description, admin_id, created_at";

impl Group {
    pub fn is_admin(&self, user_id: i32) -> bool {
        self.admin_id == user_id
    }

    pub async fn create(
        pool: &PgPool,
        group_name: &str,
        description: Option<&str>,
        admin_id: i32,
    ) -> Result<Self, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(&format!(
            r#"
            INSERT INTO groups (group_name, description, admin_id, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group_name)
        .bind(description)
        .bind(admin_id)
        .fetch_one(pool)
        .await?;

        tracing::info!("Created group {} with admin {}", group.id, admin_id);
        Ok(group)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Group>(&format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(pool)
        .await
    }
}
