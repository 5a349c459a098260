//! Registration and API key endpoints.

use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::cache::AppCache;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{
    ApiKeyListResponse, ApiKeyResponse, CreateApiKeyRequest, CreateApiKeyResponse,
    RegisterRequest, RegisterResponse,
};
use crate::services;

/// Register a new user.
///
/// Open endpoint; everything else under /api requires the key this hands
/// back. The key appears in this response and nowhere else.
#[post("/register")]
pub(super) async fn register(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let (user, api_key) = services::register_user(&pool, &body.email)?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        user_id: user.id,
        email: user.email,
        api_key,
    }))
}

/// Mint an additional API key.
#[post("/keys")]
pub(super) async fn mint_key(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    body: web::Json<CreateApiKeyRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let (record, api_key) = services::create_api_key(&pool, user.user_id, &body.name)?;

    Ok(HttpResponse::Created().json(CreateApiKeyResponse {
        id: record.id,
        name: record.name,
        api_key,
        created_at: record.created_at,
    }))
}

/// List the caller's API keys, hashes and plain text omitted.
#[get("/keys")]
pub(super) async fn list_keys(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, AppError> {
    let keys = services::list_api_keys(&pool, user.user_id)?;

    Ok(HttpResponse::Ok().json(ApiKeyListResponse {
        keys: keys.iter().map(ApiKeyResponse::from_record).collect(),
    }))
}

/// Revoke one of the caller's API keys.
#[delete("/keys/{id}")]
pub(super) async fn revoke_key(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    cache: web::Data<AppCache>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    services::revoke_api_key(&pool, Some(&cache), user.user_id, path.into_inner())?;

    Ok(HttpResponse::NoContent().finish())
}
