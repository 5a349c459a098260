//! HTTP request handlers for the link service.
//!
//! Defines all route handlers and configures the routing table.

mod auth;
mod links;
mod redirect;
mod verify;
mod health;

use actix_web::web;

/// Wire up the routing table.
///
/// The slug route is registered last; every fixed route must come before
/// the catch-all.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Registration is the only open /api endpoint
            .service(
                web::scope("/auth")
                    .service(auth::register)
                    .service(auth::mint_key)
                    .service(auth::list_keys)
                    .service(auth::revoke_key),
            )
            .service(links::shorten)
            .service(links::list)
            .service(links::show)
            .service(links::stats)
            .service(links::qr_code)
            .service(links::remove),
    )
    .service(health::health)
    .service(health::metrics)
    .service(verify::verify)
    .service(redirect::resolve);
}
