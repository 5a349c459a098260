//! Shared constants.

/// Prefix on every generated API key so keys are recognizable in configs
pub const API_KEY_PREFIX: &str = "lgk_";

/// Random characters after the prefix
pub const API_KEY_RANDOM_LENGTH: usize = 32;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

pub const DEFAULT_QR_SIZE: u32 = 256;
pub const MIN_QR_SIZE: u32 = 64;
pub const MAX_QR_SIZE: u32 = 1024;

/// Alphabet for generated slugs: URL-safe alphanumerics only
pub const SLUG_ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

/// Attempts before giving up on finding an unclaimed generated slug
pub const MAX_SLUG_GENERATION_RETRIES: u32 = 10;

/// Slugs that collide with application routes or pages and can never be
/// claimed as custom slugs. Kept lowercase; matching is case-insensitive.
pub const RESERVED_SLUGS: &[&str] = &[
    "api", "app", "auth", "login", "register", "admin", "dashboard", "settings", "profile",
    "pricing", "about", "contact", "terms", "privacy", "help", "support", "docs",
    "documentation", "blog", "status", "health", "metrics", "verify", "subscription", "billing",
    "payment", "plan", "upgrade", "downgrade", "cancel", "partner",
];

/// Name given to the API key minted at registration
pub const DEFAULT_API_KEY_NAME: &str = "Default key";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_alphabet_covers_all_alphanumerics() {
        assert_eq!(SLUG_ALPHABET.len(), 62);
        assert!(SLUG_ALPHABET.iter().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn limits_are_ordered() {
        assert!(DEFAULT_PAGE_LIMIT <= MAX_PAGE_LIMIT);
        assert!(MIN_QR_SIZE <= DEFAULT_QR_SIZE && DEFAULT_QR_SIZE <= MAX_QR_SIZE);
    }

    #[test]
    fn reserved_slugs_are_stored_lowercase() {
        for slug in RESERVED_SLUGS {
            assert_eq!(*slug, slug.to_lowercase());
        }
    }
}
