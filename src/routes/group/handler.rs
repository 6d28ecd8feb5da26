use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use crate::{
    AppState,
    error::{AppError, is_unique_violation},
    middleware::AuthUser,
    routes::user::{User, UserSummary},
    utils::{ApiResult, MessageResponse, non_blank, parse_id, success_to_api_response},
};

use super::membership::{
    GroupMembersResponse, GroupMembership, InviteRequest, MembershipAction,
    MembershipStatus, MembershipStatusResponse, MembershipWithUser, next_status,
};
use super::model::{CreateGroupRequest, Group};

/// 按路径参数加载群组，不存在时返回 404
pub async fn load_group(pool: &PgPool, raw_id: &str) -> Result<Group, AppError> {
    let group_id = parse_id(raw_id, "group")?;
    Group::find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Group not found".into()))
}

fn ensure_group_admin(group: &Group, user: &AuthUser, action: &str) -> Result<(), AppError> {
    if !group.is_admin(user.id) {
        tracing::warn!(
            "User {} is not the admin of group {} and cannot {}",
            user.id,
            group.id,
            action
        );
        return Err(AppError::Forbidden(format!("Only the admin can {}", action)));
    }
    Ok(())
}

async fn load_target_user(pool: &PgPool, user_id: i32) -> Result<User, AppError> {
    User::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// 一次成员操作对数据库记录造成的变化
enum MembershipChange {
    Created(GroupMembership),
    Updated(GroupMembership),
    Removed,
}

impl MembershipChange {
    fn into_membership(self) -> Result<GroupMembership, AppError> {
        match self {
            MembershipChange::Created(m) | MembershipChange::Updated(m) => Ok(m),
            MembershipChange::Removed => Err(AppError::NotFound("Membership not found".into())),
        }
    }
}

/// 按状态机应用成员操作：没有记录时插入，状态变化时更新，离开时删除
async fn apply_action(
    pool: &PgPool,
    group_id: i32,
    user_id: i32,
    action: MembershipAction,
) -> Result<MembershipChange, AppError> {
    let existing = GroupMembership::find(pool, group_id, user_id).await?;
    let next = next_status(existing.as_ref().map(|m| m.status), action)?;

    match (existing, next) {
        (Some(membership), Some(status)) => {
            let updated = GroupMembership::set_status(pool, membership.id, status).await?;
            Ok(MembershipChange::Updated(updated))
        }
        (Some(membership), None) => {
            GroupMembership::delete(pool, group_id, membership.user_id).await?;
            Ok(MembershipChange::Removed)
        }
        (None, Some(status)) => {
            let created = GroupMembership::insert(pool, group_id, user_id, status)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::AlreadyExists("Membership already exists".into())
                    } else {
                        AppError::Database(e)
                    }
                })?;
            Ok(MembershipChange::Created(created))
        }
        (None, None) => Err(AppError::NotFound("Membership not found".into())),
    }
}

#[axum::debug_handler]
pub async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(req), _): WithRejection<Json<CreateGroupRequest>, AppError>,
) -> ApiResult<Group> {
    let group_name = non_blank(req.group_name)
        .ok_or_else(|| AppError::BadRequest("Group name is required".into()))?;
    let description = non_blank(req.description);

    let group = Group::create(&state.pool, &group_name, description.as_deref(), user.id).await?;
    Ok((StatusCode::CREATED, success_to_api_response(group)))
}

#[axum::debug_handler]
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Vec<Group>> {
    let groups = Group::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(groups)))
}

#[axum::debug_handler]
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Group> {
    let group = load_group(&state.pool, &group_id).await?;
    Ok((StatusCode::OK, success_to_api_response(group)))
}

#[axum::debug_handler]
pub async fn request_join(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<GroupMembership> {
    let group = load_group(&state.pool, &group_id).await?;
    if group.is_admin(user.id) {
        return Err(AppError::BadRequest(
            "The admin is already part of this group".into(),
        ));
    }

    let membership = apply_action(&state.pool, group.id, user.id, MembershipAction::Request)
        .await?
        .into_membership()?;
    tracing::info!("User {} requested to join group {}", user.id, group.id);
    Ok((StatusCode::CREATED, success_to_api_response(membership)))
}

#[axum::debug_handler]
pub async fn list_members(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<GroupMembersResponse> {
    let group = load_group(&state.pool, &group_id).await?;
    let members =
        GroupMembership::list_with_users(&state.pool, group.id, MembershipStatus::Approved)
            .await?
            .into_iter()
            .map(|m| m.user)
            .collect::<Vec<UserSummary>>();

    Ok((
        StatusCode::OK,
        success_to_api_response(GroupMembersResponse {
            group_id: group.id,
            members,
        }),
    ))
}

#[axum::debug_handler]
pub async fn invite_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<InviteRequest>, AppError>,
) -> ApiResult<GroupMembership> {
    let group = load_group(&state.pool, &group_id).await?;
    ensure_group_admin(&group, &user, "invite users")?;

    let target_id = req
        .user_id
        .ok_or_else(|| AppError::BadRequest("Missing user ID in request body".into()))?;
    if group.is_admin(target_id) {
        return Err(AppError::BadRequest(
            "The admin is already part of this group".into(),
        ));
    }
    let target = load_target_user(&state.pool, target_id).await?;

    let change =
        apply_action(&state.pool, group.id, target.id, MembershipAction::Invite).await?;
    tracing::info!("Admin {} invited user {} to group {}", user.id, target.id, group.id);

    let status = if matches!(change, MembershipChange::Created(_)) {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, success_to_api_response(change.into_membership()?)))
}

#[axum::debug_handler]
pub async fn approve_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> ApiResult<MembershipStatusResponse> {
    change_status(&state, &user, &group_id, &user_id, MembershipAction::Approve).await
}

#[axum::debug_handler]
pub async fn reject_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> ApiResult<MembershipStatusResponse> {
    change_status(&state, &user, &group_id, &user_id, MembershipAction::Reject).await
}

async fn change_status(
    state: &AppState,
    admin: &AuthUser,
    raw_group_id: &str,
    raw_user_id: &str,
    action: MembershipAction,
) -> ApiResult<MembershipStatusResponse> {
    let target_id = parse_id(raw_user_id, "user")?;
    let group = load_group(&state.pool, raw_group_id).await?;
    let verb = if action == MembershipAction::Approve {
        "approve users"
    } else {
        "reject users"
    };
    ensure_group_admin(&group, admin, verb)?;
    load_target_user(&state.pool, target_id).await?;

    let membership = apply_action(&state.pool, group.id, target_id, action)
        .await?
        .into_membership()?;
    tracing::info!(
        "Admin {} set membership of user {} in group {} to {}",
        admin.id,
        target_id,
        group.id,
        membership.status.as_str()
    );

    Ok((
        StatusCode::OK,
        success_to_api_response(MembershipStatusResponse {
            user_id: target_id,
            status: membership.status,
        }),
    ))
}

#[axum::debug_handler]
pub async fn list_memberships(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<GroupMembership>> {
    let group = load_group(&state.pool, &group_id).await?;
    ensure_group_admin(&group, &user, "check membership status for this group")?;

    let memberships = GroupMembership::list_by_group(&state.pool, group.id).await?;
    Ok((StatusCode::OK, success_to_api_response(memberships)))
}

#[axum::debug_handler]
pub async fn list_pending_requests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<MembershipWithUser>> {
    let group = load_group(&state.pool, &group_id).await?;
    ensure_group_admin(&group, &user, "view pending requests")?;

    let pending =
        GroupMembership::list_with_users(&state.pool, group.id, MembershipStatus::Pending).await?;
    Ok((StatusCode::OK, success_to_api_response(pending)))
}

#[axum::debug_handler]
pub async fn leave_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<MessageResponse> {
    let group = load_group(&state.pool, &group_id).await?;
    if group.is_admin(user.id) {
        return Err(AppError::BadRequest("The admin cannot leave the group".into()));
    }

    apply_action(&state.pool, group.id, user.id, MembershipAction::Leave).await?;
    tracing::info!("User {} left group {}", user.id, group.id);
    Ok((
        StatusCode::OK,
        success_to_api_response(MessageResponse::new("You have left the group")),
    ))
}
