//! Entities and request/response types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::RESERVED_SLUGS;

// ============================================================================
// Entities
// ============================================================================

/// A stored short link: the slug, its destination, and the policies that
/// gate resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: i64,
    pub slug: String,
    pub target_url: String,
    /// Bumped on every resolution, including expired and gated ones
    pub clicks: i64,
    /// Keyed hash of the access password; presence makes the link gated
    pub password_hash: Option<String>,
    /// UTC `%Y-%m-%d %H:%M:%S`; absent means never-expiring
    pub expires_at: Option<String>,
    /// Where visitors land once `expires_at` has passed
    pub expiration_url: Option<String>,
    /// Display metadata; no effect on resolution
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickLog {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

/// A stored API key. Only the SHA-256 hash is kept; the plain key is shown
/// once at mint time and never again.
#[derive(Debug, Clone)]
pub struct ApiKeyRecord {
    pub id: i64,
    pub user_id: i64,
    pub key_hash: String,
    pub name: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
    pub is_active: bool,
}

// ============================================================================
// Requests
// ============================================================================

/// Body of POST /api/shorten.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(
        url(message = "Invalid URL format"),
        length(max = 2048, message = "URL is too long (max 2048 characters)")
    )]
    pub url: String,

    /// Custom slug; omitted means the server generates one
    #[validate(
        length(min = 1, max = 50, message = "Custom slug must be 1-50 characters"),
        custom(function = validate_slug)
    )]
    pub slug: Option<String>,

    /// Hours from now until the link expires
    pub expires_in_hours: Option<i64>,

    /// Destination for visitors arriving after expiry
    #[validate(url(message = "Invalid expiration URL format"))]
    pub expiration_url: Option<String>,

    /// Access password; hashed server-side, never stored in plain text
    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: Option<String>,

    #[validate(length(max = 160, message = "Title is too long (max 160 characters)"))]
    pub meta_title: Option<String>,
    #[validate(length(max = 500, message = "Description is too long (max 500 characters)"))]
    pub meta_description: Option<String>,
    #[validate(url(message = "Invalid image URL format"))]
    pub meta_image_url: Option<String>,
}

/// Letters, digits, and hyphens only; reserved route names can never be
/// claimed.
fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    lazy_static::lazy_static! {
        static ref SLUG_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9-]+$").unwrap();
    }
    if !SLUG_REGEX.is_match(slug) {
        return Err(validator::ValidationError::new(
            "Slug may only contain letters, numbers, and hyphens",
        ));
    }
    if RESERVED_SLUGS.contains(&slug.to_lowercase().as_str()) {
        return Err(validator::ValidationError::new(
            "This slug is reserved for system use",
        ));
    }
    Ok(())
}

/// Body of POST /verify.
///
/// Both fields are optional at the type level so a missing field produces a
/// 400 from the handler instead of a framework deserialization error.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPasswordForm {
    pub url_id: Option<i64>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email is too long (max 255 characters)")
    )]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApiKeyRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    pub slug: String,
    pub short_url: String,
    pub target_url: String,
    pub password_protected: bool,
    pub created_at: String,
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub slug: String,
    pub short_url: String,
    pub target_url: String,
    pub clicks: i64,
    pub password_protected: bool,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: Option<String>,
    pub expiration_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image_url: Option<String>,
}

impl LinkResponse {
    /// The hash never leaves the server; only the protection flag does.
    pub fn from_link(link: ShortLink, base_url: &str) -> Self {
        Self {
            id: link.id,
            short_url: format!("{}/{}", base_url, link.slug),
            slug: link.slug,
            target_url: link.target_url,
            clicks: link.clicks,
            password_protected: link.password_hash.is_some(),
            created_at: link.created_at,
            updated_at: link.updated_at,
            expires_at: link.expires_at,
            expiration_url: link.expiration_url,
            meta_title: link.meta_title,
            meta_description: link.meta_description,
            meta_image_url: link.meta_image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub links: Vec<LinkResponse>,
}

/// Answer for a gated slug: the id to hand back to /verify plus display
/// metadata for rendering the prompt. Never the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPromptResponse {
    /// Always true; lets clients tell the prompt apart from other bodies
    pub password_required: bool,
    pub url_id: i64,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable code for programmatic handling
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub email: String,
    /// Only appears here; afterwards the server holds just the hash
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
    pub is_active: bool,
}

impl ApiKeyResponse {
    pub fn from_record(record: &ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            created_at: record.created_at.clone(),
            last_used_at: record.last_used_at.clone(),
            is_active: record.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub api_key: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyListResponse {
    pub keys: Vec<ApiKeyResponse>,
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ListLinksQuery {
    /// 1-indexed page number
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// "asc" or "desc" by creation time
    pub sort: Option<String>,
}

impl Default for ListLinksQuery {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(20),
            sort: Some("desc".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrCodeQuery {
    /// "png" (default) or "svg"
    pub format: Option<String>,
    /// Edge length in pixels, clamped server-side
    pub size: Option<u32>,
}
