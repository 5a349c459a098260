//! Error taxonomy for the link service.
//!
//! Every variant maps to a terminal HTTP status; nothing here is retried.
//! The `From` impls at the bottom are the only places store-level failures
//! are translated, so "query failed" and "zero rows" stay distinct at every
//! call site.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::models::ErrorResponse;

#[derive(Debug)]
pub enum AppError {
    /// No link, user, or API key matches the given slug or id
    NotFound(String),
    /// Request payload failed validation
    ValidationError(String),
    /// The store itself failed (connection, SQL, pool checkout)
    DatabaseError(String),
    /// Slug or email collision
    DuplicateSlug(String),
    /// Link expired with no fallback destination
    LinkExpired(String),
    InternalError(String),
    /// Missing or invalid credentials, or a failed password gate
    Unauthorized(String),
    Forbidden(String),
    EmailAlreadyExists(String),
}

impl AppError {
    /// Status code and wire-level error code for this variant
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::DuplicateSlug(_) => (StatusCode::CONFLICT, "DUPLICATE_SLUG"),
            AppError::LinkExpired(_) => (StatusCode::GONE, "LINK_EXPIRED"),
            AppError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::EmailAlreadyExists(_) => (StatusCode::CONFLICT, "EMAIL_ALREADY_EXISTS"),
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::NotFound(m)
            | AppError::ValidationError(m)
            | AppError::DatabaseError(m)
            | AppError::DuplicateSlug(m)
            | AppError::LinkExpired(m)
            | AppError::InternalError(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::EmailAlreadyExists(m) => m,
        }
    }

    pub fn slug_not_found(slug: &str) -> Self {
        AppError::NotFound(format!("Link with slug '{}' not found", slug))
    }

    pub fn link_not_found_by_id(id: i64) -> Self {
        AppError::NotFound(format!("Link with ID '{}' not found", id))
    }

    pub fn link_expired(slug: &str) -> Self {
        AppError::LinkExpired(format!("Link '{}' has expired", slug))
    }

    pub fn duplicate_slug(slug: &str) -> Self {
        AppError::DuplicateSlug(format!("Slug '{}' is already taken", slug))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::InternalError(message.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind().1, self.message())
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.kind().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = self.kind();
        HttpResponse::build(status).json(ErrorResponse::new(self.message(), code))
    }
}

/// A constraint violation here almost always means a slug or email collision
/// that slipped past the application-level pre-check. Everything else is a
/// real store failure and must never read as "row does not exist".
impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                log::warn!("Constraint violation: {:?}", err);
                AppError::DuplicateSlug("A record with this value already exists".to_string())
            }
            _ => {
                log::error!("Database error: {:?}", err);
                AppError::DatabaseError(err.to_string())
            }
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        log::error!("Connection pool error: {:?}", err);
        AppError::DatabaseError(format!("Connection pool error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(format!("Invalid input: {}", err))
    }
}
