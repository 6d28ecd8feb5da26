use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub user: UserSummary,
}

#[derive(Debug, FromRow)]
struct ParticipantRow {
    id: i32,
    event_id: i32,
    user_id: i32,
    email: String,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            user: UserSummary {
                id: row.user_id,
                email: row.email,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelParticipationRequest {
    pub user_id: Option<i32>,
}

impl Participant {
    pub async fn create(pool: &PgPool, event_id: i32, user_id: i32) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, ParticipantRow>(
            r#"
            WITH inserted AS (
                INSERT INTO participants (event_id, user_id)
                VALUES ($1, $2)
                RETURNING id, event_id, user_id
            )
            SELECT inserted.id, inserted.event_id, inserted.user_id, users.email
            FROM inserted
            JOIN users ON users.id = inserted.user_id
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    pub async fn list_by_event(pool: &PgPool, event_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT participants.id, participants.event_id, participants.user_id, users.email
            FROM participants
            JOIN users ON users.id = participants.user_id
            WHERE participants.event_id = $1
            ORDER BY participants.id
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }

    /// 返回是否真的删除了报名记录
    pub async fn delete(pool: &PgPool, event_id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM participants WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
