//! Link endpoints: create, list, inspect, QR code, delete.

use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::cache::AppCache;
use crate::config::Config;
use crate::constants::DEFAULT_QR_SIZE;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::{
    CreateLinkRequest, CreateLinkResponse, LinkListResponse, LinkResponse, ListLinksQuery,
    MessageResponse, QrCodeQuery,
};
use crate::qr::{self, QrFormat};
use crate::services;

/// Create a short link for the authenticated user.
#[post("/shorten")]
pub(super) async fn shorten(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    metrics: Option<web::Data<AppMetrics>>,
    body: web::Json<CreateLinkRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    url::Url::parse(&body.url).map_err(|_| AppError::validation("Invalid URL format"))?;

    let link = services::create_link_with_metrics(
        &pool,
        &body,
        &config,
        user.user_id,
        metrics.as_ref().map(|m| m.get_ref()),
    )?;

    Ok(HttpResponse::Created().json(CreateLinkResponse {
        short_url: format!("{}/{}", config.base_url, link.slug),
        slug: link.slug,
        target_url: link.target_url,
        password_protected: link.password_hash.is_some(),
        created_at: link.created_at,
        expires_at: link.expires_at,
    }))
}

/// List the caller's links, newest first by default.
#[get("/links")]
pub(super) async fn list(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    query: web::Query<ListLinksQuery>,
) -> Result<HttpResponse, AppError> {
    let links = services::list_links(&pool, user.user_id, &query)?;
    let total = services::count_links(&pool, user.user_id)?;

    Ok(HttpResponse::Ok().json(LinkListResponse {
        total,
        links: links
            .into_iter()
            .map(|l| LinkResponse::from_link(l, &config.base_url))
            .collect(),
    }))
}

/// Point read of one of the caller's links.
#[get("/links/{id}")]
pub(super) async fn show(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let link = services::get_link_by_id(&pool, path.into_inner(), user.user_id)?;

    Ok(HttpResponse::Ok().json(LinkResponse::from_link(link, &config.base_url)))
}

/// Link details plus its most recent clicks.
#[get("/links/{id}/stats")]
pub(super) async fn stats(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let link = services::get_link_by_id(&pool, id, user.user_id)?;
    let click_logs = services::get_click_logs(&pool, id, 50)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "link": LinkResponse::from_link(link, &config.base_url),
        "recent_clicks": click_logs
    })))
}

/// QR code for the short URL, PNG by default.
#[get("/links/{id}/qr")]
pub(super) async fn qr_code(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<i64>,
    query: web::Query<QrCodeQuery>,
) -> Result<HttpResponse, AppError> {
    let link = services::get_link_by_id(&pool, path.into_inner(), user.user_id)?;
    let short_url = format!("{}/{}", config.base_url, link.slug);

    let format = query
        .format
        .as_deref()
        .map(QrFormat::parse)
        .unwrap_or_default();
    let bytes = qr::generate(&short_url, format, query.size.unwrap_or(DEFAULT_QR_SIZE))?;

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .body(bytes))
}

/// Delete one of the caller's links and drop its cached slug.
#[delete("/links/{id}")]
pub(super) async fn remove(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    cache: web::Data<AppCache>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    services::delete_link_with_cache(&pool, Some(&cache), path.into_inner(), user.user_id)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Link deleted successfully")))
}
