use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, is_unique_violation},
    utils::{
        ApiResult, generate_token, hash_password, is_valid_email, non_blank,
        success_to_api_response, verify_password,
    },
};

use super::model::{AuthResponse, LoginRequest, RegisterRequest, User, UserSummary};

const MIN_PASSWORD_LEN: usize = 6;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> ApiResult<AuthResponse> {
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(AppError::BadRequest("Email and password are required".into()));
    };
    if password.trim().is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let email = email.to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(
            "Minimum password length is 6 characters".into(),
        ));
    }

    if User::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Unauthorized("Email already registered".into()));
    }

    let hashed_password = hash_password(&password)?;

    // 并发注册时由唯一约束兜底
    let user = User::create(&state.pool, &email, &hashed_password)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Unauthorized("Email already registered".into())
            } else {
                AppError::Database(e)
            }
        })?;

    let token = generate_token(user.id, &user.email, &state.config)?;
    Ok((
        StatusCode::CREATED,
        success_to_api_response(AuthResponse {
            id: user.id,
            email: user.email,
            token,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> ApiResult<AuthResponse> {
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(AppError::BadRequest("All fields are required".into()));
    };
    if password.trim().is_empty() {
        return Err(AppError::BadRequest("All fields are required".into()));
    }

    let user = User::find_by_email(&state.pool, &email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email".into()))?;

    if !verify_password(&password, &user.hashed_password)? {
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let token = generate_token(user.id, &user.email, &state.config)?;
    tracing::debug!("User {} logged in", user.id);
    Ok((
        StatusCode::OK,
        success_to_api_response(AuthResponse {
            id: user.id,
            email: user.email,
            token,
        }),
    ))
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserSummary>> {
    let users = User::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(users)))
}
