pub mod comment;
pub mod event;
pub mod group;
pub mod like;
pub mod location;
pub mod news;
pub mod participant;
pub mod user;

use axum::{
    Router,
    http::Uri,
    routing::{delete, get, patch, post},
};

use crate::{AppState, error::AppError, middleware::auth_middleware};

/// 无需登录即可访问的路由
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // 用户
        .route("/auth/register", post(user::register))
        .route("/auth/login", post(user::login))
        .route("/auth", get(user::list_users))
        .route("/auth/users", get(user::list_users))
        // 活动
        .route("/events", get(event::list_upcoming_events))
        .route("/events/past", get(event::list_past_events))
        .route("/events/{event_id}", get(event::get_event))
        .route("/events/{event_id}/comments", get(comment::list_comments))
        .route(
            "/events/{event_id}/participants",
            get(participant::list_participants),
        )
        .route("/events/{event_id}/likes", get(like::count_likes))
        // 地点
        .route(
            "/locations",
            get(location::list_locations).post(location::create_location),
        )
        .route("/locations/{id}", get(location::get_location))
        // 群组
        .route("/groups", get(group::list_groups))
        .route("/groups/{group_id}", get(group::get_group))
        .route("/groups/{group_id}/news", get(news::list_news))
        .route("/groups/{group_id}/news/{news_id}", get(news::get_news))
}

/// 需要 Bearer 令牌的路由
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // 活动
        .route("/events", post(event::create_event))
        .route(
            "/events/{event_id}",
            patch(event::update_event).delete(event::delete_event),
        )
        .route("/events/{event_id}/comments", post(comment::create_comment))
        .route(
            "/events/{event_id}/comments/{comment_id}",
            delete(comment::delete_comment),
        )
        .route(
            "/events/{event_id}/participants",
            post(participant::sign_up_for_event).delete(participant::unsign_from_event),
        )
        .route("/events/{event_id}/likes", patch(like::toggle_like))
        // 活动管理
        .route(
            "/admin/{event_id}/participants",
            get(participant::admin_list_participants)
                .delete(participant::admin_cancel_participation),
        )
        // 群组
        .route("/groups", post(group::create_group))
        .route("/groups/{group_id}/join", post(group::request_join))
        .route("/groups/{group_id}/members", get(group::list_members))
        .route("/groups/{group_id}/invite", post(group::invite_member))
        .route(
            "/groups/{group_id}/approve/{user_id}",
            patch(group::approve_member),
        )
        .route(
            "/groups/{group_id}/reject/{user_id}",
            delete(group::reject_member),
        )
        .route("/groups/{group_id}/membership", get(group::list_memberships))
        .route(
            "/groups/{group_id}/pending-requests",
            get(group::list_pending_requests),
        )
        .route("/groups/{group_id}/leave", delete(group::leave_group))
        .route("/groups/{group_id}/news", post(news::create_news))
        .route(
            "/groups/{group_id}/news/{news_id}",
            delete(news::delete_news),
        )
        .route_layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}
