use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, is_unique_violation},
    middleware::AuthUser,
    routes::{
        event::{Event, load_event},
        user::User,
    },
    utils::{ApiResult, MessageResponse, success_to_api_response},
};

use super::model::{CancelParticipationRequest, Participant};

fn ensure_event_admin(event: &Event, user: &AuthUser) -> Result<(), AppError> {
    if event.user_id != user.id {
        return Err(AppError::Forbidden(
            "Only the event organiser can manage participants".into(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn list_participants(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<Vec<Participant>> {
    let event = load_event(&state.pool, &event_id).await?;
    let participants = Participant::list_by_event(&state.pool, event.id).await?;
    Ok((StatusCode::OK, success_to_api_response(participants)))
}

#[axum::debug_handler]
pub async fn sign_up_for_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> ApiResult<Participant> {
    let event = load_event(&state.pool, &event_id).await?;

    let participant = Participant::create(&state.pool, event.id, user.id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadyExists("Already signed up for this event".into())
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!("User {} signed up for event {}", user.id, event.id);
    Ok((StatusCode::CREATED, success_to_api_response(participant)))
}

#[axum::debug_handler]
pub async fn unsign_from_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> ApiResult<MessageResponse> {
    let event = load_event(&state.pool, &event_id).await?;

    if !Participant::delete(&state.pool, event.id, user.id).await? {
        return Err(AppError::NotFound(
            "You are not signed up for this event".into(),
        ));
    }

    Ok((
        StatusCode::OK,
        success_to_api_response(MessageResponse::new(
            "Successfully unsigned from the event",
        )),
    ))
}

#[axum::debug_handler]
pub async fn admin_list_participants(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> ApiResult<Vec<Participant>> {
    let event = load_event(&state.pool, &event_id).await?;
    ensure_event_admin(&event, &user)?;

    let participants = Participant::list_by_event(&state.pool, event.id).await?;
    Ok((StatusCode::OK, success_to_api_response(participants)))
}

#[axum::debug_handler]
pub async fn admin_cancel_participation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<CancelParticipationRequest>, AppError>,
) -> ApiResult<MessageResponse> {
    let target_id = req
        .user_id
        .ok_or_else(|| AppError::BadRequest("Missing user ID in request body".into()))?;

    let event = load_event(&state.pool, &event_id).await?;
    ensure_event_admin(&event, &user)?;

    if User::find_by_id(&state.pool, target_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    if !Participant::delete(&state.pool, event.id, target_id).await? {
        return Err(AppError::NotFound(
            "User is not signed up for this event".into(),
        ));
    }

    tracing::info!(
        "Organiser {} removed user {} from event {}",
        user.id,
        target_id,
        event.id
    );
    Ok((
        StatusCode::OK,
        success_to_api_response(MessageResponse::new(
            "Successfully unsigned from the event",
        )),
    ))
}
