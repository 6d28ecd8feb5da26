use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// 唯一约束冲突之类的重复数据
    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Token generation failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::AlreadyExists(_) | AppError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Hash(_) | AppError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> i32 {
        match self {
            AppError::BadRequest(_) | AppError::InvalidJson(_) => error_codes::VALIDATION_ERROR,
            AppError::AlreadyExists(_) => error_codes::ALREADY_EXISTS,
            AppError::Unauthorized(_) => error_codes::AUTH_FAILED,
            AppError::Forbidden(_) => error_codes::PERMISSION_DENIED,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::Database(_) | AppError::Hash(_) | AppError::Token(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }
}

/// 判断是否为唯一约束冲突
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 内部错误不把细节暴露给客户端
        let msg = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, error_to_api_response::<()>(self.error_code(), msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn client_errors_map_to_matching_status() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::AlreadyExists("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
        }
    }

    #[test]
    fn hashing_failures_stay_hashing_errors() {
        // cost 低于 bcrypt 允许的最小值
        let err: AppError = bcrypt::hash("secret123", 2).unwrap_err().into();

        assert!(matches!(err, AppError::Hash(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), error_codes::INTERNAL_ERROR);
        assert!(err.to_string().starts_with("Password hashing failed"));
    }

    #[tokio::test]
    async fn error_body_uses_api_envelope() {
        let response = AppError::Forbidden("Only the admin can invite users".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], error_codes::PERMISSION_DENIED);
        assert_eq!(body["msg"], "Only the admin can invite users");
        assert!(body.get("resp_data").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], error_codes::INTERNAL_ERROR);
        assert_eq!(body["msg"], "Internal server error");
    }
}
