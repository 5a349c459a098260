//! Redirect resolution and link password verification.
//!
//! This is the anonymous-visitor path: turning a slug into a redirect
//! decision, and checking submitted passwords for gated links.

use chrono::{NaiveDateTime, Utc};

use super::clicks::increment_clicks;
use super::links::{get_link_by_id_any, lookup_link_cached};
use crate::cache::AppCache;
use crate::config::Config;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::security;

/// A resolved slug: the link it named and the decision for the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub link_id: i64,
    pub outcome: Resolution,
}

/// Outcome of resolving a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Live link, send the visitor to the target
    Redirect(String),
    /// Expired link with a fallback destination
    ExpiredRedirect(String),
    /// Expired link with no fallback
    Gone,
    /// Link is password-protected; the visitor must verify first
    PasswordRequired {
        meta_title: Option<String>,
        meta_description: Option<String>,
        meta_image_url: Option<String>,
    },
}

/// Check whether a stored expiration timestamp lies strictly in the past
///
/// Pure comparison; a missing timestamp (never-expiring link) is handled by
/// the caller. An unparseable timestamp is an internal error, not a live
/// link.
pub fn is_expired(expires_at: &str, now: NaiveDateTime) -> Result<bool, AppError> {
    let expires = NaiveDateTime::parse_from_str(expires_at, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| AppError::internal(format!("Date parse error: {}", e)))?;
    Ok(expires < now)
}

/// Resolve a slug into a redirect decision
///
/// The click counter is bumped for every resolved slug, before expiration
/// and password policy are applied; a failed increment is logged and never
/// blocks the decision.
pub fn resolve_slug(
    pool: &DbPool,
    cache: &AppCache,
    slug: &str,
    metrics: Option<&AppMetrics>,
) -> Result<Resolved, AppError> {
    let link = lookup_link_cached(pool, cache, slug, metrics)?;

    if let Err(e) = increment_clicks(pool, link.id) {
        log::warn!("Failed to increment clicks for '{}': {}", slug, e);
    }

    let link_id = link.id;

    if let Some(expires_at) = &link.expires_at {
        if is_expired(expires_at, Utc::now().naive_utc())? {
            let outcome = match link.expiration_url {
                Some(fallback) => Resolution::ExpiredRedirect(fallback),
                None => Resolution::Gone,
            };
            return Ok(Resolved { link_id, outcome });
        }
    }

    if link.password_protected {
        return Ok(Resolved {
            link_id,
            outcome: Resolution::PasswordRequired {
                meta_title: link.meta_title,
                meta_description: link.meta_description,
                meta_image_url: link.meta_image_url,
            },
        });
    }

    Ok(Resolved {
        link_id,
        outcome: Resolution::Redirect(link.target_url),
    })
}

/// Verify a submitted password for a link and return the target URL
///
/// The stored hash is recomputed from the submitted password and the
/// process-wide secret; an unprotected link rejects every submission.
pub fn verify_link_password(
    pool: &DbPool,
    config: &Config,
    link_id: i64,
    password: &str,
    metrics: Option<&AppMetrics>,
) -> Result<String, AppError> {
    let link = get_link_by_id_any(pool, link_id)?;

    let matches = link
        .password_hash
        .as_deref()
        .map(|stored| security::verify_password(password, &config.hash_secret, stored))
        .unwrap_or(false);

    if !matches {
        if let Some(m) = metrics {
            m.record_password_verification("invalid");
        }
        log::info!("Password verification failed for link {}", link_id);
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    if let Some(m) = metrics {
        m.record_password_verification("success");
    }
    log::info!("Password verification succeeded for link {}", link_id);
    Ok(link.target_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{create_link, get_link_by_slug, register_user};
    use crate::test_utils::{create_request, setup_test_db, test_config};
    use chrono::Duration;

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn timestamp(offset_hours: i64) -> String {
        (Utc::now() + Duration::hours(offset_hours))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    // ========================================================================
    // is_expired
    // ========================================================================

    #[test]
    fn test_is_expired_past_timestamp() {
        assert!(is_expired(&timestamp(-1), now()).unwrap());
        assert!(is_expired("2001-01-01 00:00:00", now()).unwrap());
    }

    #[test]
    fn test_is_expired_future_timestamp() {
        assert!(!is_expired(&timestamp(1), now()).unwrap());
        assert!(!is_expired("2999-01-01 00:00:00", now()).unwrap());
    }

    #[test]
    fn test_is_expired_exact_instant_is_not_expired() {
        // Strictly-before comparison: the boundary instant is still live
        let instant =
            NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(!is_expired("2024-06-01 12:00:00", instant).unwrap());
    }

    #[test]
    fn test_is_expired_unparseable_is_an_error() {
        assert!(is_expired("not-a-date", now()).is_err());
        assert!(is_expired("2024-13-45", now()).is_err());
    }

    // ========================================================================
    // resolve_slug
    // ========================================================================

    #[test]
    fn test_resolve_plain_link_redirects() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let request = create_request("https://example.com", Some("abc123"));
        create_link(&pool, &request, &config, user.id).unwrap();

        let resolved = resolve_slug(&pool, &cache, "abc123", None).unwrap();
        assert_eq!(
            resolved.outcome,
            Resolution::Redirect("https://example.com".to_string())
        );
    }

    #[test]
    fn test_resolve_increments_clicks() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let request = create_request("https://example.com", Some("counted"));
        create_link(&pool, &request, &config, user.id).unwrap();

        resolve_slug(&pool, &cache, "counted", None).unwrap();
        assert_eq!(get_link_by_slug(&pool, "counted").unwrap().clicks, 1);

        resolve_slug(&pool, &cache, "counted", None).unwrap();
        assert_eq!(get_link_by_slug(&pool, "counted").unwrap().clicks, 2);
    }

    #[test]
    fn test_resolve_unknown_slug_is_not_found() {
        let pool = setup_test_db();
        let cache = AppCache::default();

        let result = resolve_slug(&pool, &cache, "nope", None);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_resolve_expired_with_fallback() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("old1"));
        request.expires_in_hours = Some(-24);
        request.expiration_url = Some("https://example.com/gone".to_string());
        create_link(&pool, &request, &config, user.id).unwrap();

        let resolved = resolve_slug(&pool, &cache, "old1", None).unwrap();
        assert_eq!(
            resolved.outcome,
            Resolution::ExpiredRedirect("https://example.com/gone".to_string())
        );
    }

    #[test]
    fn test_resolve_expired_without_fallback_is_gone() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("old2"));
        request.expires_in_hours = Some(-1);
        create_link(&pool, &request, &config, user.id).unwrap();

        let resolved = resolve_slug(&pool, &cache, "old2", None).unwrap();
        assert_eq!(resolved.outcome, Resolution::Gone);
    }

    #[test]
    fn test_resolve_expired_still_counts_click() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("old3"));
        request.expires_in_hours = Some(-1);
        create_link(&pool, &request, &config, user.id).unwrap();

        resolve_slug(&pool, &cache, "old3", None).unwrap();
        assert_eq!(get_link_by_slug(&pool, "old3").unwrap().clicks, 1);
    }

    #[test]
    fn test_resolve_protected_link_asks_for_password() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("sec1"));
        request.password = Some("secret".to_string());
        request.meta_title = Some("Protected page".to_string());
        let link = create_link(&pool, &request, &config, user.id).unwrap();

        let resolved = resolve_slug(&pool, &cache, "sec1", None).unwrap();
        assert_eq!(resolved.link_id, link.id);
        match resolved.outcome {
            Resolution::PasswordRequired { meta_title, .. } => {
                assert_eq!(meta_title.as_deref(), Some("Protected page"));
            }
            other => panic!("expected PasswordRequired, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_expiry_wins_over_password() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("sec-old"));
        request.password = Some("secret".to_string());
        request.expires_in_hours = Some(-1);
        request.expiration_url = Some("https://example.com/gone".to_string());
        create_link(&pool, &request, &config, user.id).unwrap();

        let resolved = resolve_slug(&pool, &cache, "sec-old", None).unwrap();
        assert_eq!(
            resolved.outcome,
            Resolution::ExpiredRedirect("https://example.com/gone".to_string())
        );
    }

    #[test]
    fn test_resolve_uses_cache_on_second_call() {
        let pool = setup_test_db();
        let config = test_config();
        let cache = AppCache::default();
        let registry = prometheus::Registry::new();
        let metrics = crate::metrics::AppMetrics::new(&registry).unwrap();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let request = create_request("https://example.com", Some("hot"));
        create_link(&pool, &request, &config, user.id).unwrap();

        resolve_slug(&pool, &cache, "hot", Some(&metrics)).unwrap();
        resolve_slug(&pool, &cache, "hot", Some(&metrics)).unwrap();

        assert_eq!(
            metrics.cache_misses_total.with_label_values(&["link"]).get() as u64,
            1
        );
        assert_eq!(
            metrics.cache_hits_total.with_label_values(&["link"]).get() as u64,
            1
        );
        // Both resolutions counted
        assert_eq!(get_link_by_slug(&pool, "hot").unwrap().clicks, 2);
    }

    // ========================================================================
    // verify_link_password
    // ========================================================================

    #[test]
    fn test_verify_correct_password_returns_target() {
        let pool = setup_test_db();
        let config = test_config();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("sec2"));
        request.password = Some("secret".to_string());
        let link = create_link(&pool, &request, &config, user.id).unwrap();

        let target = verify_link_password(&pool, &config, link.id, "secret", None).unwrap();
        assert_eq!(target, "https://example.com");
    }

    #[test]
    fn test_verify_wrong_password_is_unauthorized() {
        let pool = setup_test_db();
        let config = test_config();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("sec3"));
        request.password = Some("secret".to_string());
        let link = create_link(&pool, &request, &config, user.id).unwrap();

        let result = verify_link_password(&pool, &config, link.id, "wrong", None);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_unknown_link_is_not_found() {
        let pool = setup_test_db();
        let config = test_config();

        let result = verify_link_password(&pool, &config, 99999, "secret", None);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_verify_unprotected_link_is_unauthorized() {
        let pool = setup_test_db();
        let config = test_config();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let request = create_request("https://example.com", Some("open"));
        let link = create_link(&pool, &request, &config, user.id).unwrap();

        let result = verify_link_password(&pool, &config, link.id, "anything", None);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_records_metrics() {
        let pool = setup_test_db();
        let config = test_config();
        let registry = prometheus::Registry::new();
        let metrics = crate::metrics::AppMetrics::new(&registry).unwrap();

        let (user, _) = register_user(&pool, "test@example.com").unwrap();
        let mut request = create_request("https://example.com", Some("sec4"));
        request.password = Some("secret".to_string());
        let link = create_link(&pool, &request, &config, user.id).unwrap();

        verify_link_password(&pool, &config, link.id, "secret", Some(&metrics)).unwrap();
        let _ = verify_link_password(&pool, &config, link.id, "wrong", Some(&metrics));

        assert_eq!(
            metrics
                .password_verifications_total
                .with_label_values(&["success"])
                .get() as u64,
            1
        );
        assert_eq!(
            metrics
                .password_verifications_total
                .with_label_values(&["invalid"])
                .get() as u64,
            1
        );
    }
}
