//! User registration and API key management.
//!
//! Keys are random tokens handed out exactly once; the store only ever holds
//! their SHA-256 hashes. Validation runs through the API key cache, so
//! `last_used_at` is refreshed at cache-miss granularity rather than on
//! every request.

use rusqlite::params;

use super::helpers::{generate_api_key, hash_api_key, map_api_key_row, map_user_row};
use crate::cache::{AppCache, CachedApiKey};
use crate::constants::DEFAULT_API_KEY_NAME;
use crate::db::{get_conn, DbPool};
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::{ApiKeyRecord, User};
use crate::queries::{ApiKeys, Users};

/// Register a new user and mint their first API key.
///
/// The plain-text key is returned exactly once; afterwards only its hash
/// exists.
pub fn register_user(pool: &DbPool, email: &str) -> Result<(User, String), AppError> {
    let conn = get_conn(pool)?;

    let taken: i64 = conn.query_row(Users::COUNT_BY_EMAIL, params![email], |row| row.get(0))?;
    if taken > 0 {
        return Err(AppError::EmailAlreadyExists(format!(
            "Email '{}' is already registered",
            email
        )));
    }

    conn.execute(Users::INSERT, params![email])?;
    let user = conn.query_row(
        Users::SELECT_BY_ID,
        params![conn.last_insert_rowid()],
        map_user_row,
    )?;

    let api_key = generate_api_key();
    conn.execute(
        ApiKeys::INSERT,
        params![user.id, hash_api_key(&api_key), DEFAULT_API_KEY_NAME],
    )?;

    log::info!("Registered user {} (id {})", email, user.id);
    Ok((user, api_key))
}

/// Mint an additional API key for an existing user.
pub fn create_api_key(
    pool: &DbPool,
    user_id: i64,
    name: &str,
) -> Result<(ApiKeyRecord, String), AppError> {
    let conn = get_conn(pool)?;

    let api_key = generate_api_key();
    conn.execute(
        ApiKeys::INSERT,
        params![user_id, hash_api_key(&api_key), name],
    )?;

    let record = conn.query_row(
        ApiKeys::SELECT_BY_ID,
        params![conn.last_insert_rowid()],
        map_api_key_row,
    )?;

    log::info!("Created API key '{}' for user {}", name, user_id);
    Ok((record, api_key))
}

/// Validate an API key against the store.
///
/// Returns `(user_id, key_id)` for an active key and stamps `last_used_at`.
/// An unknown or revoked key is Unauthorized; a store failure stays a
/// DatabaseError.
pub fn validate_api_key(pool: &DbPool, api_key: &str) -> Result<(i64, i64), AppError> {
    let conn = get_conn(pool)?;

    let (key_id, user_id): (i64, i64) = conn
        .query_row(
            ApiKeys::SELECT_BY_HASH,
            params![hash_api_key(api_key)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::Unauthorized("Invalid API key".into())
            }
            _ => AppError::DatabaseError(e.to_string()),
        })?;

    conn.execute(ApiKeys::UPDATE_LAST_USED, params![key_id])?;

    Ok((user_id, key_id))
}

/// Validate an API key through the cache.
///
/// Only positive results are cached, keyed by the key's hash. On a hit the
/// store is not consulted at all, which bounds the staleness of both
/// revocation and `last_used_at` by the cache TTL.
pub fn validate_api_key_cached(
    pool: &DbPool,
    cache: &AppCache,
    api_key: &str,
    metrics: Option<&AppMetrics>,
) -> Result<(i64, i64), AppError> {
    let key_hash = hash_api_key(api_key);

    if let Some(hit) = cache.get_api_key(&key_hash) {
        log::debug!("API key cache hit");
        if let Some(m) = metrics {
            m.record_cache_hit("api_key");
            m.record_api_key_validation("success");
        }
        return Ok((hit.user_id, hit.key_id));
    }

    log::debug!("API key cache miss");
    if let Some(m) = metrics {
        m.record_cache_miss("api_key");
    }

    match validate_api_key(pool, api_key) {
        Ok((user_id, key_id)) => {
            cache.insert_api_key(&key_hash, CachedApiKey { user_id, key_id });
            if let Some(m) = metrics {
                m.record_api_key_validation("success");
            }
            Ok((user_id, key_id))
        }
        Err(e) => {
            if let Some(m) = metrics {
                m.record_api_key_validation("invalid");
            }
            Err(e)
        }
    }
}

pub fn list_api_keys(pool: &DbPool, user_id: i64) -> Result<Vec<ApiKeyRecord>, AppError> {
    let conn = get_conn(pool)?;
    let mut stmt = conn.prepare(ApiKeys::SELECT_BY_USER)?;

    let keys = stmt
        .query_map(params![user_id], map_api_key_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(keys)
}

/// Deactivate an API key owned by the given user.
///
/// The cached validation entry is dropped as well when a cache is supplied;
/// without one, a revoked key stays usable until its cache entry expires.
pub fn revoke_api_key(
    pool: &DbPool,
    cache: Option<&AppCache>,
    user_id: i64,
    key_id: i64,
) -> Result<(), AppError> {
    let conn = get_conn(pool)?;

    let owned: i64 = conn.query_row(
        ApiKeys::COUNT_BY_ID_AND_USER,
        params![key_id, user_id],
        |row| row.get(0),
    )?;
    if owned == 0 {
        return Err(AppError::NotFound(format!(
            "API key with ID '{}' not found",
            key_id
        )));
    }

    let key_hash: Option<String> = match cache {
        Some(_) => conn
            .query_row(ApiKeys::SELECT_KEY_HASH_BY_ID, params![key_id], |row| {
                row.get(0)
            })
            .ok(),
        None => None,
    };

    conn.execute(ApiKeys::DEACTIVATE, params![key_id, user_id])?;

    if let (Some(cache), Some(hash)) = (cache, key_hash) {
        cache.invalidate_api_key(&hash);
    }

    log::info!("Revoked API key {} for user {}", key_id, user_id);
    Ok(())
}
