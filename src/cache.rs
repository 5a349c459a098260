//! In-memory caches for slug lookups and API key validation.
//!
//! Both caches are `moka` sync caches with TTL eviction. `Cache` handles its
//! own sharing internally, so `AppCache` clones are cheap and all clones see
//! the same entries.

use moka::sync::Cache;

/// Everything the resolution path needs to decide a redirect.
///
/// A cache hit never touches the database except for the click increment.
/// The password hash itself is deliberately absent; verification always
/// reads the stored record.
#[derive(Clone, Debug)]
pub struct CachedLink {
    pub id: i64,
    pub target_url: String,
    pub expires_at: Option<String>,
    pub expiration_url: Option<String>,
    pub password_protected: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image_url: Option<String>,
}

/// A positive API key validation, keyed by the key's SHA-256 hash.
///
/// Only successful validations are cached; a revoked key disappears at
/// invalidation time or when its entry expires.
#[derive(Clone, Copy, Debug)]
pub struct CachedApiKey {
    pub user_id: i64,
    pub key_id: i64,
}

#[derive(Clone)]
pub struct AppCache {
    pub link_cache: Cache<String, CachedLink>,
    pub api_key_cache: Cache<String, CachedApiKey>,
}

impl AppCache {
    pub fn new(
        link_ttl_secs: u64,
        link_capacity: u64,
        api_key_ttl_secs: u64,
        api_key_capacity: u64,
    ) -> Self {
        Self {
            link_cache: Cache::builder()
                .max_capacity(link_capacity)
                .time_to_live(std::time::Duration::from_secs(link_ttl_secs))
                .build(),
            api_key_cache: Cache::builder()
                .max_capacity(api_key_capacity)
                .time_to_live(std::time::Duration::from_secs(api_key_ttl_secs))
                .build(),
        }
    }

    pub fn insert_link(&self, slug: &str, link: CachedLink) {
        self.link_cache.insert(slug.to_string(), link);
    }

    pub fn get_link(&self, slug: &str) -> Option<CachedLink> {
        self.link_cache.get(slug)
    }

    pub fn invalidate_link(&self, slug: &str) {
        self.link_cache.invalidate(slug);
    }

    pub fn insert_api_key(&self, key_hash: &str, key: CachedApiKey) {
        self.api_key_cache.insert(key_hash.to_string(), key);
    }

    pub fn get_api_key(&self, key_hash: &str) -> Option<CachedApiKey> {
        self.api_key_cache.get(key_hash)
    }

    pub fn invalidate_api_key(&self, key_hash: &str) {
        self.api_key_cache.invalidate(key_hash);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(300, 10_000, 600, 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn link(id: i64, target: &str) -> CachedLink {
        CachedLink {
            id,
            target_url: target.to_string(),
            expires_at: None,
            expiration_url: None,
            password_protected: false,
            meta_title: None,
            meta_description: None,
            meta_image_url: None,
        }
    }

    #[test]
    fn link_roundtrip_and_miss() {
        let cache = AppCache::default();
        assert!(cache.get_link("abc123").is_none());

        cache.insert_link("abc123", link(1, "https://example.com"));

        let hit = cache.get_link("abc123").expect("entry should be present");
        assert_eq!(hit.id, 1);
        assert_eq!(hit.target_url, "https://example.com");
    }

    #[test]
    fn invalidated_link_is_gone() {
        let cache = AppCache::default();
        cache.insert_link("abc123", link(1, "https://example.com"));
        cache.invalidate_link("abc123");
        assert!(cache.get_link("abc123").is_none());
    }

    #[test]
    fn clones_share_entries() {
        let cache = AppCache::default();
        let other = cache.clone();

        cache.insert_link("shared", link(9, "https://example.com"));
        assert!(other.get_link("shared").is_some());
    }

    #[test]
    fn api_key_roundtrip_and_invalidation() {
        let cache = AppCache::default();

        cache.insert_api_key(
            "hash123",
            CachedApiKey {
                user_id: 1,
                key_id: 42,
            },
        );

        let hit = cache.get_api_key("hash123").expect("entry should be present");
        assert_eq!((hit.user_id, hit.key_id), (1, 42));

        cache.invalidate_api_key("hash123");
        assert!(cache.get_api_key("hash123").is_none());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = AppCache::new(1, 100, 1, 100);

        cache.insert_link("ttl", link(1, "https://example.com"));
        assert!(cache.get_link("ttl").is_some());

        thread::sleep(Duration::from_millis(1100));
        assert!(cache.get_link("ttl").is_none());
    }
}
