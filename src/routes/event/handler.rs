use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    routes::location::Location,
    utils::{ApiResult, MessageResponse, parse_id, success_to_api_response},
};

use super::model::{CreateEventRequest, Event, EventDraft, UpdateEventRequest};

/// 按路径参数加载活动，不存在时返回 404
pub async fn load_event(pool: &PgPool, raw_id: &str) -> Result<Event, AppError> {
    let event_id = parse_id(raw_id, "event")?;
    Event::find_by_id(pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

async fn ensure_location_exists(pool: &PgPool, location_id: Option<i32>) -> Result<(), AppError> {
    if let Some(id) = location_id {
        if Location::find_by_id(pool, id).await?.is_none() {
            return Err(AppError::NotFound("Location not found".into()));
        }
    }
    Ok(())
}

fn ensure_owner(event: &Event, user: &AuthUser, action: &str) -> Result<(), AppError> {
    if event.user_id != user.id {
        tracing::warn!(
            "User {} tried to {} event {} owned by {}",
            user.id,
            action,
            event.id,
            event.user_id
        );
        return Err(AppError::Forbidden(format!(
            "You can only {} your own events",
            action
        )));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn list_upcoming_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let events = Event::list_upcoming(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(events)))
}

#[axum::debug_handler]
pub async fn list_past_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let events = Event::list_past(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(events)))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Event> {
    let event = load_event(&state.pool, &id).await?;
    Ok((StatusCode::OK, success_to_api_response(event)))
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(req), _): WithRejection<Json<CreateEventRequest>, AppError>,
) -> ApiResult<Event> {
    let draft = EventDraft::from_create(req)?;
    ensure_location_exists(&state.pool, draft.location_id).await?;

    let event = Event::create(&state.pool, &draft, user.id).await?;
    tracing::info!("User {} created event {}", user.id, event.id);
    Ok((StatusCode::CREATED, success_to_api_response(event)))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateEventRequest>, AppError>,
) -> ApiResult<Event> {
    let event = load_event(&state.pool, &id).await?;
    ensure_owner(&event, &user, "update")?;

    let draft = EventDraft::merge_update(&event, req)?;
    if draft.location_id != event.location_id {
        ensure_location_exists(&state.pool, draft.location_id).await?;
    }

    let updated = Event::update(&state.pool, event.id, &draft).await?;
    Ok((StatusCode::OK, success_to_api_response(updated)))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let event = load_event(&state.pool, &id).await?;
    ensure_owner(&event, &user, "delete")?;

    Event::delete(&state.pool, event.id).await?;
    tracing::info!("User {} deleted event {}", user.id, event.id);
    Ok((
        StatusCode::OK,
        success_to_api_response(MessageResponse::new("Event deleted")),
    ))
}
