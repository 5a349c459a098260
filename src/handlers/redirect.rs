//! Redirect endpoint handler.

use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::cache::AppCache;
use crate::config::Config;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::PasswordPromptResponse;
use crate::services::{self, Resolution};

/// Turn a visited slug into a redirect decision.
///
/// A live open link answers 302 to its target, an expired link 302 to its
/// fallback or 410 without one, and a gated link gets the password prompt.
#[get("/{slug}")]
pub(super) async fn resolve(
    pool: web::Data<DbPool>,
    cache: web::Data<AppCache>,
    config: web::Data<Config>,
    metrics: Option<web::Data<AppMetrics>>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    // Don't resolve common browser probes
    if slug == "favicon.ico" || slug == "robots.txt" {
        return Err(AppError::NotFound("Resource not found".into()));
    }

    let resolved =
        services::resolve_slug(&pool, &cache, &slug, metrics.as_ref().map(|m| m.get_ref()))?;

    // Record detailed click log if logging is enabled
    if config.click_logging_enabled {
        let ip_address = req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string());

        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let referer = req
            .headers()
            .get("referer")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let _ = services::record_click(
            &pool,
            resolved.link_id,
            ip_address.as_deref(),
            user_agent.as_deref(),
            referer.as_deref(),
        );
    }

    let link_id = resolved.link_id;
    match resolved.outcome {
        Resolution::Redirect(target_url) => {
            if let Some(ref m) = metrics {
                m.record_redirect();
            }
            log::info!("Redirecting {} -> {}", slug, target_url);
            Ok(HttpResponse::Found()
                .append_header(("Location", target_url))
                .finish())
        }
        Resolution::ExpiredRedirect(fallback_url) => {
            if let Some(ref m) = metrics {
                m.record_redirect();
            }
            log::info!("Link {} expired, redirecting to fallback", slug);
            Ok(HttpResponse::Found()
                .append_header(("Location", fallback_url))
                .finish())
        }
        Resolution::Gone => {
            log::info!("Link {} expired with no fallback", slug);
            Err(AppError::link_expired(&slug))
        }
        Resolution::PasswordRequired {
            meta_title,
            meta_description,
            meta_image_url,
        } => {
            log::info!("Link {} requires a password", slug);
            Ok(HttpResponse::Ok().json(PasswordPromptResponse {
                password_required: true,
                url_id: link_id,
                meta_title,
                meta_description,
                meta_image_url,
            }))
        }
    }
}
