use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, routes::user::User, utils::verify_token};

/// 认证通过后挂在请求扩展上的当前用户
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

    // 格式: "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let claims = verify_token(token, &state.config).map_err(|e| {
        tracing::warn!("Error verifying token: {}", e);
        AppError::Forbidden("Invalid token".into())
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Forbidden("Invalid token".into()))?;

    // 令牌有效但用户可能已被删除
    let user = User::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    tracing::debug!("Authenticated user {}", user.id);
    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}
