//! Shared test fixtures.

#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cache::AppCache;
use crate::config::Config;
use crate::db::{init_pool, run_migrations, DbPool};
use crate::models::CreateLinkRequest;

static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh migrated pool over a named in-memory database.
///
/// Shared-cache mode lets every pooled connection see the same data, while
/// the per-call name keeps parallel tests from observing each other's rows.
pub fn setup_test_db() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let url = format!("file:testdb{}?mode=memory&cache=shared", id);
    let pool = init_pool(&url).expect("Failed to create test pool");
    run_migrations(&pool).expect("Failed to run migrations");
    pool
}

pub fn test_config() -> Config {
    Config::default()
}

pub fn test_cache() -> AppCache {
    AppCache::default()
}

/// Minimal link-creation request; tests mutate the fields they care about.
pub fn create_request(url: &str, slug: Option<&str>) -> CreateLinkRequest {
    CreateLinkRequest {
        url: url.to_string(),
        slug: slug.map(|s| s.to_string()),
        expires_in_hours: None,
        expiration_url: None,
        password: None,
        meta_title: None,
        meta_description: None,
        meta_image_url: None,
    }
}

pub fn create_test_user(pool: &DbPool, email: &str) -> (crate::models::User, String) {
    crate::services::register_user(pool, email).expect("Failed to create test user")
}
