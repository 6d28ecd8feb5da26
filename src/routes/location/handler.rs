use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    utils::{ApiResult, parse_id, success_to_api_response},
};

use super::model::{CreateLocationRequest, Location};

#[axum::debug_handler]
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<Vec<Location>> {
    let locations = Location::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(locations)))
}

#[axum::debug_handler]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Location> {
    let id = parse_id(&id, "address")?;
    let location = Location::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".into()))?;
    Ok((StatusCode::OK, success_to_api_response(location)))
}

#[axum::debug_handler]
pub async fn create_location(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateLocationRequest>, AppError>,
) -> ApiResult<Location> {
    let new = req
        .validate()
        .map_err(|errors| AppError::BadRequest(errors.join(", ")))?;

    let location = Location::create(&state.pool, &new).await?;
    Ok((StatusCode::CREATED, success_to_api_response(location)))
}
