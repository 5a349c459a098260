//! Application configuration.
//!
//! Built from the environment exactly once at startup and handed to
//! handlers as app data; nothing reads the environment after this point.

use std::env;
use std::fmt::Debug;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Base URL prepended to slugs when rendering short URLs
    pub base_url: String,
    /// Length of generated slugs
    pub slug_length: usize,
    /// Secret keying link password hashes. Required: a baked-in fallback
    /// would make every deployment's hashes interchangeable.
    pub hash_secret: String,
    pub link_cache_ttl_secs: u64,
    pub link_cache_max_capacity: u64,
    pub api_key_cache_ttl_secs: u64,
    pub api_key_cache_max_capacity: u64,
    pub metrics_enabled: bool,
    pub click_logging_enabled: bool,
}

/// Read an environment variable, falling back to `default` when unset.
///
/// # Panics
/// Panics when the variable is set but does not parse; a misconfigured
/// deployment should fail at startup, not limp along on a default.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{} is invalid: {:?}", key, e)),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: `DATABASE_URL`, `HOST`, `PORT`, `BASE_URL`,
    /// `SLUG_LENGTH`, `HASH_SECRET` (required), `LINK_CACHE_TTL_SECS`,
    /// `LINK_CACHE_MAX_CAPACITY`, `API_KEY_CACHE_TTL_SECS`,
    /// `API_KEY_CACHE_MAX_CAPACITY`, `METRICS_ENABLED`,
    /// `CLICK_LOGGING_ENABLED`.
    ///
    /// # Panics
    /// Panics when `HASH_SECRET` is unset or empty, or when a set variable
    /// fails to parse.
    pub fn from_env() -> Self {
        let host: String = env_or("HOST", "127.0.0.1".to_string());
        let port: u16 = env_or("PORT", 8080);

        let hash_secret = env::var("HASH_SECRET").expect("HASH_SECRET must be set");
        assert!(!hash_secret.is_empty(), "HASH_SECRET must not be empty");

        Self {
            database_url: env_or("DATABASE_URL", "links.db".to_string()),
            base_url: env_or("BASE_URL", format!("http://{}:{}", host, port)),
            host,
            port,
            slug_length: env_or("SLUG_LENGTH", 7),
            hash_secret,
            link_cache_ttl_secs: env_or("LINK_CACHE_TTL_SECS", 300),
            link_cache_max_capacity: env_or("LINK_CACHE_MAX_CAPACITY", 10_000),
            api_key_cache_ttl_secs: env_or("API_KEY_CACHE_TTL_SECS", 600),
            api_key_cache_max_capacity: env_or("API_KEY_CACHE_MAX_CAPACITY", 1_000),
            metrics_enabled: env_or("METRICS_ENABLED", true),
            click_logging_enabled: env_or("CLICK_LOGGING_ENABLED", true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "links.db".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            slug_length: 7,
            hash_secret: "test-secret".to_string(),
            link_cache_ttl_secs: 300,
            link_cache_max_capacity: 10_000,
            api_key_cache_ttl_secs: 600,
            api_key_cache_max_capacity: 1_000,
            metrics_enabled: true,
            click_logging_enabled: true,
        }
    }
}
