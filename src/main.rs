//! # linkgate
//!
//! Self-hosted short-link server on Actix-web and SQLite.
//!
//! Users register for an API key and create links, optionally gated behind
//! a password or bounded by an expiration window with a fallback
//! destination. Anonymous visitors resolve links via `GET /{slug}`.

mod auth;
mod cache;
mod config;
mod constants;
mod db;
mod errors;
mod handlers;
mod metrics;
mod models;
mod qr;
mod queries;
mod security;
mod services;
mod test_utils;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Fails fast when HASH_SECRET is unset
    let config = config::Config::from_env();

    let pool = db::init_pool(&config.database_url).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");

    let app_cache = cache::AppCache::new(
        config.link_cache_ttl_secs,
        config.link_cache_max_capacity,
        config.api_key_cache_ttl_secs,
        config.api_key_cache_max_capacity,
    );
    info!(
        "Caches ready: links {}s/{} entries, API keys {}s/{} entries",
        config.link_cache_ttl_secs,
        config.link_cache_max_capacity,
        config.api_key_cache_ttl_secs,
        config.api_key_cache_max_capacity
    );

    let app_metrics = if config.metrics_enabled {
        let registry = prometheus::Registry::new();
        let m = metrics::AppMetrics::new(&registry).expect("Failed to register metrics");
        info!("Metrics exposed at /metrics");
        Some((registry, m))
    } else {
        None
    };

    // 60 requests per minute per IP
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(1)
        .burst_size(60)
        .finish()
        .expect("Failed to create rate limiter configuration");

    let bind_addr = format!("{}:{}", config.host, config.port);
    info!("Starting linkgate at http://{}", bind_addr);
    info!("Short links resolve at {}/{{slug}}", config.base_url);

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(app_cache.clone()));

        if let Some((registry, m)) = &app_metrics {
            app = app
                .app_data(web::Data::new(registry.clone()))
                .app_data(web::Data::new(m.clone()));
        }

        app.wrap(Governor::new(&governor_conf))
            .wrap(Logger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
