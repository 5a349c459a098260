//! Health check and metrics exposition handlers.

use actix_web::{get, web, HttpResponse};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::errors::AppError;

/// Health check endpoint
#[get("/health")]
pub(super) async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus metrics endpoint
///
/// The registry is only registered as app data when metrics are enabled;
/// without it the endpoint reports not found.
#[get("/metrics")]
pub(super) async fn metrics(
    registry: Option<web::Data<Registry>>,
) -> Result<HttpResponse, AppError> {
    let registry = registry.ok_or_else(|| AppError::NotFound("Metrics are disabled".into()))?;

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| AppError::InternalError(format!("Failed to encode metrics: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer))
}
