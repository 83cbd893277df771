//! Short code generation and validation utilities.
//!
//! Provides random code drawing over a fixed alphanumeric alphabet and
//! validation for caller-supplied custom codes.

use crate::error::AppError;
use rand::Rng;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// The 62-character alphabet generated codes are drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Minimum length of a custom code.
pub const MIN_CUSTOM_CODE_LENGTH: usize = 3;

/// Codes that collide with fixed top-level routes and would never redirect.
pub const RESERVED_CODES: &[&str] = &["health", "api"];

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap());

/// Draws `length` characters uniformly at random from [`ALPHABET`].
///
/// # Examples
///
/// ```ignore
/// let mut rng = StdRng::seed_from_u64(7);
/// let code = random_code(&mut rng, 6);
/// assert_eq!(code.len(), 6);
/// ```
pub fn random_code<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `code` is shadowed by a fixed route. Matching is exact.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Returns true if every character of `code` belongs to [`ALPHABET`].
pub fn is_alphabet_code(code: &str) -> bool {
    code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - At least 3 characters
/// - Letters, digits and hyphens only
/// - Case is preserved; `Promo` and `promo` are different codes
/// - Not one of [`RESERVED_CODES`]
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.chars().count() < MIN_CUSTOM_CODE_LENGTH {
        return Err(AppError::bad_request(
            format!("Custom code must be at least {MIN_CUSTOM_CODE_LENGTH} characters"),
            json!({ "provided_length": code.chars().count() }),
        ));
    }

    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, and hyphens",
            json!({ "code": code }),
        ));
    }

    if is_reserved_code(code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
