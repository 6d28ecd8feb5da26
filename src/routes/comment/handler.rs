use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    routes::event::load_event,
    utils::{ApiResult, MessageResponse, non_blank, parse_id, success_to_api_response},
};

use super::model::{Comment, CreateCommentRequest};

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<Vec<Comment>> {
    let event = load_event(&state.pool, &event_id).await?;
    let comments = Comment::list_by_event(&state.pool, event.id).await?;
    Ok((StatusCode::OK, success_to_api_response(comments)))
}

#[axum::debug_handler]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<CreateCommentRequest>, AppError>,
) -> ApiResult<Comment> {
    let content = non_blank(req.content)
        .ok_or_else(|| AppError::BadRequest("Comment content is required".into()))?;
    let event = load_event(&state.pool, &event_id).await?;

    let comment = Comment::create(&state.pool, event.id, user.id, &content).await?;
    Ok((StatusCode::CREATED, success_to_api_response(comment)))
}

#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((event_id, comment_id)): Path<(String, String)>,
) -> ApiResult<MessageResponse> {
    let event = load_event(&state.pool, &event_id).await?;
    let comment_id = parse_id(&comment_id, "comment")?;

    let comment = Comment::find_in_event(&state.pool, event.id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    if comment.user_id != user.id {
        return Err(AppError::Forbidden(
            "You can only delete your own comments".into(),
        ));
    }

    Comment::delete(&state.pool, comment.id).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(MessageResponse::new("Comment deleted")),
    ))
}
