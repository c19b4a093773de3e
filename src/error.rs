//! Application error taxonomy and its HTTP mapping.
//!
//! Services return [`AppResult`]; handlers hand the error straight back to axum,
//! which renders it as `{"message": "..."}` with the matching status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use serde::Serialize;
use tracing::error;

use crate::auth::jwt::JwtError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    /// Missing or unusable credentials (401)
    Unauthorized,

    #[error("Permission denied: {0}")]
    /// Authenticated but not allowed (403)
    Forbidden(String),

    #[error("Resource not found: {0}")]
    /// 404
    NotFound(String),

    #[error("Conflict: {0}")]
    /// Business-rule or uniqueness conflict (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 400
    Validation(String),

    #[error("Database error: {0}")]
    /// 500, message is logged and never sent to clients
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(why: impl Into<String>) -> Self {
        Self::Conflict(why.into())
    }

    pub fn validation(why: impl Into<String>) -> Self {
        Self::Validation(why.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                "Internal server error".to_string()
            }
            AppError::Unauthorized => "Please login first".to_string(),
            AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg) => msg.clone(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                AppError::Conflict(format!("Duplicate value: {msg}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                AppError::Conflict(format!("Record is still referenced: {msg}"))
            }
            _ if is_serialization_failure(&err) => {
                AppError::Conflict("Concurrent update detected, please retry".to_string())
            }
            _ => match err {
                DbErr::RecordNotFound(msg) => AppError::NotFound(msg),
                other => AppError::Database(other.to_string()),
            },
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken | JwtError::InvalidToken(_) | JwtError::InvalidSignature => {
                AppError::Unauthorized
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// SQLSTATE 40001 (serialization failure) or 40P01 (deadlock detected).
fn is_serialization_failure(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| code == "40001" || code == "40P01"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn record_not_found_becomes_not_found() {
        let err: AppError = DbErr::RecordNotFound("sitting 9".into()).into();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "sitting 9"));
    }

    #[test]
    fn other_db_errors_stay_opaque() {
        let err: AppError = DbErr::Custom("disk on fire".into()).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
