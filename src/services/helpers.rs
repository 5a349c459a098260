//! Row mapping and token generation shared across the service layer.

use nanoid::nanoid;
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

use crate::constants::{API_KEY_PREFIX, API_KEY_RANDOM_LENGTH, SLUG_ALPHABET};
use crate::models::{ApiKeyRecord, ClickLog, ShortLink, User};

pub(super) fn map_link_row(row: &rusqlite::Row) -> rusqlite::Result<ShortLink> {
    Ok(ShortLink {
        id: row.get("id")?,
        slug: row.get("slug")?,
        target_url: row.get("target_url")?,
        clicks: row.get("clicks")?,
        password_hash: row.get("password_hash")?,
        expires_at: row.get("expires_at")?,
        expiration_url: row.get("expiration_url")?,
        meta_title: row.get("meta_title")?,
        meta_description: row.get("meta_description")?,
        meta_image_url: row.get("meta_image_url")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        user_id: row.get("user_id")?,
    })
}

pub(super) fn map_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

pub(super) fn map_api_key_row(row: &rusqlite::Row) -> rusqlite::Result<ApiKeyRecord> {
    Ok(ApiKeyRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        key_hash: row.get("key_hash")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        last_used_at: row.get("last_used_at")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
    })
}

pub(super) fn map_click_log_row(row: &rusqlite::Row) -> rusqlite::Result<ClickLog> {
    Ok(ClickLog {
        id: row.get("id")?,
        link_id: row.get("link_id")?,
        clicked_at: row.get("clicked_at")?,
        ip_address: row.get("ip_address")?,
        user_agent: row.get("user_agent")?,
        referer: row.get("referer")?,
    })
}

/// Random slug over the URL-safe alphabet.
pub fn generate_slug(length: usize) -> String {
    nanoid!(length, &SLUG_ALPHABET)
}

/// Random API key, prefixed so keys are recognizable in configs and logs.
pub fn generate_api_key() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", API_KEY_PREFIX, token)
}

/// SHA-256 over the key, hex-encoded; this is what the store holds.
pub fn hash_api_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_use_the_configured_alphabet() {
        let slug = generate_slug(7);
        assert_eq!(slug.len(), 7);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn api_keys_are_prefixed_and_sized() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        assert_eq!(key.len(), API_KEY_PREFIX.len() + API_KEY_RANDOM_LENGTH);
    }

    #[test]
    fn key_hashing_is_stable_hex() {
        let hash = hash_api_key("lgk_test123");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key("lgk_test123"));
        assert_ne!(hash, hash_api_key("lgk_test124"));
    }
}
