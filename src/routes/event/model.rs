use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::{
    error::AppError,
    utils::{non_blank, parse_event_date},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub date: DateTime<Utc>,
    pub distance: Option<f64>,
    pub ticket_price: Option<f64>,
    pub location_id: Option<i32>,
    pub user_id: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub distance: Option<f64>,
    pub ticket_price: Option<f64>,
    pub location_id: Option<i32>,
}

/// 部分更新，缺省字段保持原值
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub distance: Option<f64>,
    pub ticket_price: Option<f64>,
    pub location_id: Option<i32>,
}

/// 校验通过、可以写入数据库的活动字段
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub date: DateTime<Utc>,
    pub distance: Option<f64>,
    pub ticket_price: Option<f64>,
    pub location_id: Option<i32>,
}

const EVENT_COLUMNS: &str = "id, name, date, distance, ticket_price, location_id, user_id";

fn parse_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_event_date(raw).ok_or_else(|| AppError::BadRequest("Invalid date format".into()))
}

fn check_amount(value: Option<f64>, field: &str) -> Result<Option<f64>, AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::BadRequest(format!(
            "{} must be a non-negative number",
            field
        ))),
        other => Ok(other),
    }
}

impl EventDraft {
    pub fn from_create(req: CreateEventRequest) -> Result<Self, AppError> {
        let name =
            non_blank(req.name).ok_or_else(|| AppError::BadRequest("Name is required".into()))?;
        let date = req
            .date
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Invalid date format".into()))
            .and_then(parse_date)?;

        Ok(Self {
            name,
            date,
            distance: check_amount(req.distance, "distance")?,
            ticket_price: check_amount(req.ticket_price, "ticketPrice")?,
            location_id: req.location_id,
        })
    }

    pub fn merge_update(event: &Event, req: UpdateEventRequest) -> Result<Self, AppError> {
        let name = match req.name {
            Some(name) => non_blank(Some(name))
                .ok_or_else(|| AppError::BadRequest("Name is required".into()))?,
            None => event.name.clone(),
        };
        let date = match req.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => event.date,
        };

        Ok(Self {
            name,
            date,
            distance: check_amount(req.distance.or(event.distance), "distance")?,
            ticket_price: check_amount(req.ticket_price.or(event.ticket_price), "ticketPrice")?,
            location_id: req.location_id.or(event.location_id),
        })
    }
}

impl Event {
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 尚未开始的活动，按时间先后排列
    pub async fn list_upcoming(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE date >= NOW() ORDER BY date ASC, id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    /// 已经结束的活动，最近的在前
    pub async fn list_past(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE date < NOW() ORDER BY date DESC, id DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        draft: &EventDraft,
        user_id: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (name, date, distance, ticket_price, location_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(draft.date)
        .bind(draft.distance)
        .bind(draft.ticket_price)
        .bind(draft.location_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &PgPool, id: i32, draft: &EventDraft) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET name = $1, date = $2, distance = $3, ticket_price = $4, location_id = $5
            WHERE id = $6
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(draft.date)
        .bind(draft.distance)
        .bind(draft.ticket_price)
        .bind(draft.location_id)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
