use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::{error::AppError, routes::user::UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "membership_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Pending,
    Approved,
    Rejected,
}

/// 触发成员状态变化的操作，`Request` 和 `Leave` 由成员自己发起
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Request,
    Invite,
    Approve,
    Reject,
    Leave,
}

impl MembershipAction {
    fn verb(&self) -> &'static str {
        match self {
            MembershipAction::Request => "request",
            MembershipAction::Invite => "invite",
            MembershipAction::Approve => "approve",
            MembershipAction::Reject => "reject",
            MembershipAction::Leave => "leave",
        }
    }
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "PENDING",
            MembershipStatus::Approved => "APPROVED",
            MembershipStatus::Rejected => "REJECTED",
        }
    }
}

/// 根据当前状态（没有记录为 `None`）计算操作之后的状态，`Ok(None)` 表示记录被删除
pub fn next_status(
    current: Option<MembershipStatus>,
    action: MembershipAction,
) -> Result<Option<MembershipStatus>, AppError> {
    use MembershipAction::*;
    use MembershipStatus::*;

    match (action, current) {
        (Request, None | Some(Rejected)) => Ok(Some(Pending)),
        (Request, Some(Pending)) => Err(AppError::AlreadyExists(
            "You have already requested to join this group (PENDING)".into(),
        )),
        (Request, Some(Approved)) => Err(AppError::AlreadyExists(
            "You are already a member of this group (APPROVED)".into(),
        )),

        (Invite, None | Some(Pending) | Some(Rejected)) => Ok(Some(Approved)),
        (Invite, Some(Approved)) => Err(AppError::AlreadyExists(
            "User is already a member of this group (APPROVED)".into(),
        )),

        (Approve, Some(Pending)) => Ok(Some(Approved)),
        (Reject, Some(Pending) | Some(Approved)) => Ok(Some(Rejected)),
        (Leave, Some(Pending) | Some(Approved)) => Ok(None),

        (Approve | Reject, None) => Err(AppError::NotFound(
            "Membership request not found".into(),
        )),
        (Leave, None) => Err(AppError::NotFound(
            "You are not a member of this group".into(),
        )),
        (_, Some(status)) => Err(AppError::BadRequest(format!(
            "Cannot {} a membership that is {}",
            action.verb(),
            status.as_str()
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub status: MembershipStatus,
}

/// 带申请人信息的成员记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipWithUser {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub status: MembershipStatus,
    pub user: UserSummary,
}

#[derive(Debug, FromRow)]
struct MembershipUserRow {
    id: i32,
    group_id: i32,
    user_id: i32,
    status: MembershipStatus,
    email: String,
}

impl From<MembershipUserRow> for MembershipWithUser {
    fn from(row: MembershipUserRow) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            user_id: row.user_id,
            status: row.status,
            user: UserSummary {
                id: row.user_id,
                email: row.email,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub user_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipStatusResponse {
    pub user_id: i32,
    pub status: MembershipStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersResponse {
    pub group_id: i32,
    pub members: Vec<UserSummary>,
}

const MEMBERSHIP_COLUMNS: &str = "id, group_id, user_id, status";

impl GroupMembership {
    pub async fn find(
        pool: &PgPool,
        group_id: i32,
        user_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GroupMembership>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM group_memberships WHERE group_id = $1 AND user_id = $2"
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(
        pool: &PgPool,
        group_id: i32,
        user_id: i32,
        status: MembershipStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, GroupMembership>(&format!(
            r#"
            INSERT INTO group_memberships (group_id, user_id, status)
            VALUES ($1, $2, $3)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(group_id)
        .bind(user_id)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: i32,
        status: MembershipStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, GroupMembership>(&format!(
            r#"
            UPDATE group_memberships
            SET status = $1
            WHERE id = $2
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// 返回是否真的删除了成员记录
    pub async fn delete(pool: &PgPool, group_id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM group_memberships WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_group(pool: &PgPool, group_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GroupMembership>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM group_memberships WHERE group_id = $1 ORDER BY id"
        ))
        .bind(group_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_with_users(
        pool: &PgPool,
        group_id: i32,
        status: MembershipStatus,
    ) -> Result<Vec<MembershipWithUser>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MembershipUserRow>(
            r#"
            SELECT m.id, m.group_id, m.user_id, m.status, u.email
            FROM group_memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = $1 AND m.status = $2
            ORDER BY m.id
            "#,
        )
        .bind(group_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(MembershipWithUser::from).collect())
    }

    pub async fn is_approved_member(
        pool: &PgPool,
        group_id: i32,
        user_id: i32,
    ) -> Result<bool, sqlx::Error> {
        Ok(Self::find(pool, group_id, user_id)
            .await?
            .is_some_and(|m| m.status == MembershipStatus::Approved))
    }
}
