//! Link CRUD, lookup, and caching services.

use chrono::{Duration, Utc};
use rusqlite::params;

use super::helpers::{generate_slug, map_link_row};
use crate::cache::{AppCache, CachedLink};
use crate::config::Config;
use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_SLUG_GENERATION_RETRIES};
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::{CreateLinkRequest, ListLinksQuery, ShortLink};
use crate::queries::Links;
use crate::security;

/// Create a new short link
pub fn create_link(
    pool: &DbPool,
    request: &CreateLinkRequest,
    config: &Config,
    user_id: i64,
) -> Result<ShortLink, AppError> {
    create_link_with_metrics(pool, request, config, user_id, None)
}

/// Create a new short link with optional metrics recording
///
/// The slug UNIQUE constraint is the actual uniqueness guarantee; the
/// existence pre-checks below only produce friendlier errors. A lost race
/// still surfaces as a 409 through the constraint-violation mapping.
pub fn create_link_with_metrics(
    pool: &DbPool,
    request: &CreateLinkRequest,
    config: &Config,
    user_id: i64,
    metrics: Option<&AppMetrics>,
) -> Result<ShortLink, AppError> {
    let conn = get_conn(pool)?;

    // Use custom slug or generate one
    let slug = match &request.slug {
        Some(slug) => {
            if slug_exists(&conn, slug)? {
                return Err(AppError::duplicate_slug(slug));
            }
            slug.clone()
        }
        None => {
            let mut slug = generate_slug(config.slug_length);
            let mut attempts = 0;
            while slug_exists(&conn, &slug)? && attempts < MAX_SLUG_GENERATION_RETRIES {
                slug = generate_slug(config.slug_length);
                attempts += 1;
            }
            if attempts >= MAX_SLUG_GENERATION_RETRIES {
                return Err(AppError::InternalError(
                    "Failed to generate unique slug".into(),
                ));
            }
            slug
        }
    };

    // Calculate expiration date if specified
    let expires_at = request.expires_in_hours.map(|hours| {
        (Utc::now() + Duration::hours(hours))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    });

    // Passwords are hashed here, at the storage boundary; plain text never
    // leaves the request
    let password_hash = request
        .password
        .as_deref()
        .map(|password| security::hash_password(password, &config.hash_secret));

    conn.execute(
        Links::INSERT,
        params![
            slug,
            request.url,
            password_hash,
            expires_at,
            request.expiration_url,
            request.meta_title,
            request.meta_description,
            request.meta_image_url,
            user_id
        ],
    )?;

    // Retrieve the created link
    let link = get_link_by_slug(pool, &slug)?;
    log::info!(
        "Created link: {} -> {} (user: {}, protected: {})",
        slug,
        request.url,
        user_id,
        link.password_hash.is_some()
    );

    if let Some(m) = metrics {
        m.record_link_created();
    }

    Ok(link)
}

/// Check if a slug already exists
fn slug_exists(conn: &rusqlite::Connection, slug: &str) -> Result<bool, AppError> {
    let count: i32 = conn.query_row(Links::COUNT_BY_SLUG, params![slug], |row| row.get(0))?;
    Ok(count > 0)
}

/// Get a link by its slug (no ownership check, no expiry policy)
///
/// Zero rows map to NotFound; any other failure surfaces as DatabaseError so
/// a broken store is never mistaken for a missing slug.
pub fn get_link_by_slug(pool: &DbPool, slug: &str) -> Result<ShortLink, AppError> {
    let conn = get_conn(pool)?;

    conn.query_row(Links::SELECT_BY_SLUG, params![slug], map_link_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::slug_not_found(slug),
            _ => AppError::DatabaseError(e.to_string()),
        })
}

/// Get a link by its slug with caching (for redirect resolution)
///
/// Checks the cache first, then falls back to the database on cache miss.
/// Expiration policy is applied by the caller; expired entries stay cached
/// since expiry is monotonic and the cached fields decide the outcome.
pub fn lookup_link_cached(
    pool: &DbPool,
    cache: &AppCache,
    slug: &str,
    metrics: Option<&AppMetrics>,
) -> Result<CachedLink, AppError> {
    if let Some(cached) = cache.get_link(slug) {
        log::debug!("Cache hit for slug: {}", slug);
        if let Some(m) = metrics {
            m.record_cache_hit("link");
        }
        return Ok(cached);
    }

    // Cache miss - query database
    log::debug!("Cache miss for slug: {}, querying database", slug);
    if let Some(m) = metrics {
        m.record_cache_miss("link");
    }

    let link = get_link_by_slug(pool, slug)?;

    let cached = CachedLink {
        id: link.id,
        target_url: link.target_url,
        expires_at: link.expires_at,
        expiration_url: link.expiration_url,
        password_protected: link.password_hash.is_some(),
        meta_title: link.meta_title,
        meta_description: link.meta_description,
        meta_image_url: link.meta_image_url,
    };
    cache.insert_link(slug, cached.clone());

    Ok(cached)
}

/// Get a link by its ID (for API - checks ownership)
pub fn get_link_by_id(pool: &DbPool, id: i64, user_id: i64) -> Result<ShortLink, AppError> {
    let conn = get_conn(pool)?;

    conn.query_row(Links::SELECT_BY_ID_AND_USER, params![id, user_id], map_link_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::link_not_found_by_id(id),
            _ => AppError::DatabaseError(e.to_string()),
        })
}

/// Get a link by its ID regardless of owner (for password verification)
pub fn get_link_by_id_any(pool: &DbPool, id: i64) -> Result<ShortLink, AppError> {
    let conn = get_conn(pool)?;

    conn.query_row(Links::SELECT_BY_ID, params![id], map_link_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::link_not_found_by_id(id),
            _ => AppError::DatabaseError(e.to_string()),
        })
}

/// List links for a specific user with pagination
pub fn list_links(
    pool: &DbPool,
    user_id: i64,
    query: &ListLinksQuery,
) -> Result<Vec<ShortLink>, AppError> {
    let conn = get_conn(pool)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = (page - 1) * limit;
    let sort_order = match query.sort.as_deref() {
        Some("asc") => "ASC",
        _ => "DESC",
    };

    let sql = Links::list_by_user_with_order(sort_order);
    let mut stmt = conn.prepare(&sql)?;
    let links = stmt
        .query_map(params![user_id, limit, offset], map_link_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(links)
}

/// Get total count of links for a user
pub fn count_links(pool: &DbPool, user_id: i64) -> Result<usize, AppError> {
    let conn = get_conn(pool)?;
    let count: i64 = conn.query_row(Links::COUNT_BY_USER, params![user_id], |row| row.get(0))?;
    Ok(count as usize)
}

/// Delete a link by ID (checks ownership)
pub fn delete_link(pool: &DbPool, id: i64, user_id: i64) -> Result<(), AppError> {
    delete_link_with_cache(pool, None, id, user_id)
}

/// Delete a link by ID with cache invalidation (checks ownership)
pub fn delete_link_with_cache(
    pool: &DbPool,
    cache: Option<&AppCache>,
    id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    let conn = get_conn(pool)?;

    // Get the slug before deleting for cache invalidation
    let slug: Option<String> = if cache.is_some() {
        conn.query_row(Links::SELECT_SLUG_BY_ID, params![id], |row| row.get(0))
            .ok()
    } else {
        None
    };

    let rows_affected = conn.execute(Links::DELETE_BY_ID_AND_USER, params![id, user_id])?;

    if rows_affected == 0 {
        return Err(AppError::link_not_found_by_id(id));
    }

    // Invalidate cache if we have the slug
    if let (Some(cache), Some(slug)) = (cache, slug) {
        cache.invalidate_link(&slug);
        log::debug!("Invalidated cache for slug: {}", slug);
    }

    log::info!("Deleted link with ID: {} (user: {})", id, user_id);
    Ok(())
}
