//! Request authentication for the API surface.
//!
//! `AuthenticatedUser` is an actix extractor: any handler that takes one as
//! a parameter requires a valid API key, supplied either as
//! `Authorization: Bearer <key>` or as `X-API-Key: <key>`.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::cache::AppCache;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::services;

/// The identity behind a validated API key.
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Pull the API key out of the request headers.
///
/// `Authorization: Bearer` wins when both headers are present.
fn api_key_from_headers(req: &HttpRequest) -> Option<&str> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    bearer
        .or_else(|| {
            req.headers()
                .get("X-API-Key")
                .and_then(|v| v.to_str().ok())
        })
        .map(str::trim)
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req);
        ready(result)
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let pool = req
        .app_data::<web::Data<DbPool>>()
        .ok_or_else(|| AppError::internal("Database pool not available"))?;

    let api_key = api_key_from_headers(req).ok_or_else(|| {
        AppError::Unauthorized(
            "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header".into(),
        )
    })?;

    let metrics = req
        .app_data::<web::Data<AppMetrics>>()
        .map(|m| m.get_ref());

    // Validation goes through the cache when one is registered as app data
    let (user_id, _key_id) = match req.app_data::<web::Data<AppCache>>() {
        Some(cache) => services::validate_api_key_cached(pool, cache, api_key, metrics)?,
        None => services::validate_api_key(pool, api_key)?,
    };

    Ok(AuthenticatedUser { user_id })
}
