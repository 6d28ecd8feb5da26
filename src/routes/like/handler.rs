use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    routes::event::load_event,
    utils::{ApiResult, MessageResponse, success_to_api_response},
};

use super::model::{EventLike, LikeCount, ToggleOutcome};

#[axum::debug_handler]
pub async fn count_likes(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<LikeCount> {
    let event = load_event(&state.pool, &event_id).await?;
    let likes = EventLike::count(&state.pool, event.id).await?;
    Ok((StatusCode::OK, success_to_api_response(LikeCount { likes })))
}

/// 新增点赞返回 201 和点赞记录，取消点赞返回 200 和提示信息
#[axum::debug_handler]
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let event = load_event(&state.pool, &event_id).await?;

    let response = match EventLike::toggle(&state.pool, event.id, user.id).await? {
        ToggleOutcome::Liked(like) => {
            (StatusCode::CREATED, success_to_api_response(like)).into_response()
        }
        ToggleOutcome::Unliked => (
            StatusCode::OK,
            success_to_api_response(MessageResponse::new("Like removed")),
        )
            .into_response(),
    };
    Ok(response)
}
