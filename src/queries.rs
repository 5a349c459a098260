//! SQL statements, grouped per table.
//!
//! Kept as named constants so every query is reviewable in one place.

/// DDL run at startup.
pub struct Schema;

impl Schema {
    /// The UNIQUE constraint on slug is the real uniqueness guarantee;
    /// application-level pre-checks only exist for friendlier errors.
    pub const CREATE_LINKS_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS links (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            slug            TEXT NOT NULL UNIQUE,
            target_url      TEXT NOT NULL,
            clicks          INTEGER NOT NULL DEFAULT 0,
            password_hash   TEXT,
            expires_at      TEXT,
            expiration_url  TEXT,
            meta_title      TEXT,
            meta_description TEXT,
            meta_image_url  TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
            user_id         INTEGER,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )";

    pub const CREATE_SLUG_INDEX: &'static str =
        "CREATE INDEX IF NOT EXISTS idx_slug ON links (slug)";

    pub const CREATE_CLICK_LOGS_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS click_logs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            link_id         INTEGER NOT NULL,
            clicked_at      TEXT NOT NULL DEFAULT (datetime('now')),
            ip_address      TEXT,
            user_agent      TEXT,
            referer         TEXT,
            FOREIGN KEY (link_id) REFERENCES links (id) ON DELETE CASCADE
        )";

    pub const CREATE_USERS_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        )";

    pub const CREATE_API_KEYS_TABLE: &'static str = "
        CREATE TABLE IF NOT EXISTS api_keys (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL,
            key_hash     TEXT NOT NULL UNIQUE,
            name         TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now')),
            last_used_at TEXT,
            is_active    INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )";
}

pub struct Users;

impl Users {
    pub const INSERT: &'static str = "INSERT INTO users (email) VALUES (?1)";

    pub const SELECT_BY_ID: &'static str =
        "SELECT id, email, created_at FROM users WHERE id = ?1";

    pub const COUNT_BY_EMAIL: &'static str = "SELECT COUNT(*) FROM users WHERE email = ?1";
}

pub struct ApiKeys;

impl ApiKeys {
    pub const INSERT: &'static str =
        "INSERT INTO api_keys (user_id, key_hash, name) VALUES (?1, ?2, ?3)";

    pub const SELECT_BY_ID: &'static str =
        "SELECT id, user_id, key_hash, name, created_at, last_used_at, is_active
         FROM api_keys WHERE id = ?1";

    /// Only active keys validate; revocation flips is_active rather than
    /// deleting the row.
    pub const SELECT_BY_HASH: &'static str =
        "SELECT id, user_id FROM api_keys WHERE key_hash = ?1 AND is_active = 1";

    pub const SELECT_BY_USER: &'static str =
        "SELECT id, user_id, key_hash, name, created_at, last_used_at, is_active
         FROM api_keys WHERE user_id = ?1 ORDER BY created_at DESC";

    pub const COUNT_BY_ID_AND_USER: &'static str =
        "SELECT COUNT(*) FROM api_keys WHERE id = ?1 AND user_id = ?2 AND is_active = 1";

    pub const SELECT_KEY_HASH_BY_ID: &'static str =
        "SELECT key_hash FROM api_keys WHERE id = ?1";

    pub const DEACTIVATE: &'static str =
        "UPDATE api_keys SET is_active = 0 WHERE id = ?1 AND user_id = ?2";

    pub const UPDATE_LAST_USED: &'static str =
        "UPDATE api_keys SET last_used_at = datetime('now') WHERE id = ?1";
}

pub struct Links;

impl Links {
    pub const INSERT: &'static str = "
        INSERT INTO links (slug, target_url, password_hash, expires_at, expiration_url,
                           meta_title, meta_description, meta_image_url, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

    pub const SELECT_BY_SLUG: &'static str = "
        SELECT id, slug, target_url, clicks, password_hash, expires_at, expiration_url,
               meta_title, meta_description, meta_image_url, created_at, updated_at, user_id
        FROM links WHERE slug = ?1";

    pub const SELECT_BY_ID: &'static str = "
        SELECT id, slug, target_url, clicks, password_hash, expires_at, expiration_url,
               meta_title, meta_description, meta_image_url, created_at, updated_at, user_id
        FROM links WHERE id = ?1";

    pub const SELECT_BY_ID_AND_USER: &'static str = "
        SELECT id, slug, target_url, clicks, password_hash, expires_at, expiration_url,
               meta_title, meta_description, meta_image_url, created_at, updated_at, user_id
        FROM links WHERE id = ?1 AND user_id = ?2";

    pub const COUNT_BY_SLUG: &'static str = "SELECT COUNT(*) FROM links WHERE slug = ?1";

    pub const COUNT_BY_USER: &'static str = "SELECT COUNT(*) FROM links WHERE user_id = ?1";

    pub const DELETE_BY_ID_AND_USER: &'static str =
        "DELETE FROM links WHERE id = ?1 AND user_id = ?2";

    pub const SELECT_SLUG_BY_ID: &'static str = "SELECT slug FROM links WHERE id = ?1";

    /// Single atomic UPDATE; the counter is never read-modify-written in
    /// the application.
    pub const INCREMENT_CLICKS: &'static str =
        "UPDATE links SET clicks = clicks + 1, updated_at = datetime('now') WHERE id = ?1";

    /// List query for one user with the given sort direction applied.
    pub fn list_by_user_with_order(sort_order: &str) -> String {
        format!(
            "SELECT id, slug, target_url, clicks, password_hash, expires_at, expiration_url,
                    meta_title, meta_description, meta_image_url, created_at, updated_at, user_id
             FROM links
             WHERE user_id = ?1
             ORDER BY created_at {}
             LIMIT ?2 OFFSET ?3",
            sort_order
        )
    }
}

pub struct ClickLogs;

impl ClickLogs {
    pub const INSERT: &'static str =
        "INSERT INTO click_logs (link_id, ip_address, user_agent, referer) VALUES (?1, ?2, ?3, ?4)";

    pub const SELECT_BY_LINK_ID: &'static str = "
        SELECT id, link_id, clicked_at, ip_address, user_agent, referer
        FROM click_logs
        WHERE link_id = ?1
        ORDER BY clicked_at DESC
        LIMIT ?2";
}
