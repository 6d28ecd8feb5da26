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
    routes::group::{GroupMembership, load_group},
    utils::{ApiResult, MessageResponse, non_blank, parse_id, success_to_api_response},
};

use super::model::{CreateNewsRequest, GroupNews};

#[axum::debug_handler]
pub async fn list_news(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<GroupNews>> {
    let group = load_group(&state.pool, &group_id).await?;
    let news = GroupNews::list_by_group(&state.pool, group.id).await?;
    Ok((StatusCode::OK, success_to_api_response(news)))
}

#[axum::debug_handler]
pub async fn get_news(
    State(state): State<AppState>,
    Path((group_id, news_id)): Path<(String, String)>,
) -> ApiResult<GroupNews> {
    let news_id = parse_id(&news_id, "news")?;
    let group = load_group(&state.pool, &group_id).await?;

    let news = GroupNews::find_in_group(&state.pool, group.id, news_id)
        .await?
        .ok_or_else(|| AppError::NotFound("News not found".into()))?;
    Ok((StatusCode::OK, success_to_api_response(news)))
}

/// 只有群管理员和已通过审核的成员可以发布
#[axum::debug_handler]
pub async fn create_news(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<CreateNewsRequest>, AppError>,
) -> ApiResult<GroupNews> {
    let group = load_group(&state.pool, &group_id).await?;

    let allowed = group.is_admin(user.id)
        || GroupMembership::is_approved_member(&state.pool, group.id, user.id).await?;
    if !allowed {
        return Err(AppError::Forbidden(
            "Only approved members can post news in this group".into(),
        ));
    }

    let (Some(news_name), Some(content)) = (non_blank(req.news_name), non_blank(req.content))
    else {
        return Err(AppError::BadRequest("News title and content are required".into()));
    };

    let news = GroupNews::create(&state.pool, group.id, user.id, &news_name, &content).await?;
    tracing::info!("User {} posted news {} in group {}", user.id, news.id, group.id);
    Ok((StatusCode::CREATED, success_to_api_response(news)))
}

#[axum::debug_handler]
pub async fn delete_news(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((group_id, news_id)): Path<(String, String)>,
) -> ApiResult<MessageResponse> {
    let news_id = parse_id(&news_id, "news")?;
    let group = load_group(&state.pool, &group_id).await?;

    let news = GroupNews::find_in_group(&state.pool, group.id, news_id)
        .await?
        .ok_or_else(|| AppError::NotFound("News not found".into()))?;
    if news.user_id != user.id && !group.is_admin(user.id) {
        return Err(AppError::Forbidden(
            "Only the author or the admin can delete this news".into(),
        ));
    }

    GroupNews::delete(&state.pool, news.id).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(MessageResponse::new("News deleted")),
    ))
}
