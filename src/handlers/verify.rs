//! Password verification endpoint handler.

use actix_web::{post, web, HttpResponse};

use crate::config::Config;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::VerifyPasswordForm;
use crate::services;

/// Verify a link password and redirect on success
///
/// Invoked by the password prompt with the link ID handed out during
/// resolution. Missing fields are a 400, an unknown ID a 404, and a
/// mismatch a 401.
#[post("/verify")]
pub(super) async fn verify(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    metrics: Option<web::Data<AppMetrics>>,
    form: web::Form<VerifyPasswordForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let (url_id, password) = match (form.url_id, form.password) {
        (Some(url_id), Some(password)) if !password.is_empty() => (url_id, password),
        _ => {
            return Err(AppError::validation(
                "Both 'url_id' and 'password' are required",
            ));
        }
    };

    let target_url = services::verify_link_password(
        &pool,
        &config,
        url_id,
        &password,
        metrics.as_ref().map(|m| m.get_ref()),
    )?;

    Ok(HttpResponse::Found()
        .append_header(("Location", target_url))
        .finish())
}
