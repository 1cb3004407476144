//! Short code generation and validation utilities.
//!
//! Two generators exist and a process uses exactly one of them, selected by
//! [`CodeStrategy`]:
//!
//! - [`ShortCodeEncoder`] turns the store-assigned link id into a Sqids code
//!   over a shuffled alphabet. Distinct ids give distinct codes.
//! - [`generate_random_code`] draws a fixed-length alphanumeric string that the
//!   caller checks them against storage.
//!
//! User aliases share the same namespace and go through [`validate_alias`].

use crate::error::AppError;
use rand::{Rng, distr::Alphanumeric};
use regex::Regex;
use serde_json::json;
use sqids::Sqids;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Shuffled alphanumeric alphabet used when none is configured.
pub const DEFAULT_ALPHABET: &str = "1xnXM9kBN6cdYsAvjW3Co7luRePDh8ywaUQ4TStpfH0rqFVK2zimLGIJOgb5ZE";

/// Minimum length of encoded codes when none is configured.
pub const DEFAULT_MIN_LENGTH: u8 = 8;

/// Length of codes drawn by [`generate_random_code`].
pub const RANDOM_CODE_LENGTH: usize = 8;

pub const ALIAS_MIN_LENGTH: usize = 5;
pub const ALIAS_MAX_LENGTH: usize = 10;

static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias pattern compiles"));

/// Codes that would shadow top-level routes.
const RESERVED_CODES: &[&str] = &["health", "api"];

/// How codes are produced for links created without an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStrategy {
    /// Encode the link id after insert (second write, no probing).
    #[default]
    Derived,
    /// Draw random codes and check for collisions before insert.
    Random,
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "derived" => Ok(Self::Derived),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown short code strategy '{}', expected 'derived' or 'random'",
                other
            )),
        }
    }
}

impl fmt::Display for CodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Derived => write!(f, "derived"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Reversible id-to-code encoder.
///
/// Wraps a configured [`Sqids`] instance. Codes are at least `min_length`
/// characters long and never sequential-looking, since the alphabet is shuffled.
pub struct ShortCodeEncoder {
    sqids: Sqids,
}

impl ShortCodeEncoder {
    /// Builds an encoder from an alphabet and a minimum code length.
    ///
    /// # Errors
    ///
    /// Returns the Sqids error if the alphabet is too short, contains
    /// duplicate or multibyte characters.
    pub fn new(alphabet: &str, min_length: u8) -> Result<Self, sqids::Error> {
        let sqids = Sqids::builder()
            .alphabet(alphabet.chars().collect())
            .min_length(min_length)
            .build()?;
        Ok(Self { sqids })
    }

    /// Encodes a link id.
    ///
    /// `attempt == 0` gives the canonical code for the id. Higher attempts
    /// encode `[id, attempt]`, which yields a different, still unique code; it
    /// is used when the canonical code is already taken by a user alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the id is negative or Sqids fails.
    pub fn encode(&self, id: i64, attempt: u32) -> Result<String, AppError> {
        let id = u64::try_from(id).map_err(|_| AppError::internal("negative link id"))?;
        let numbers: Vec<u64> = if attempt == 0 {
            vec![id]
        } else {
            vec![id, u64::from(attempt)]
        };
        self.sqids.encode(&numbers).map_err(AppError::internal)
    }

    /// Decodes a code back into the numbers it was built from.
    ///
    /// Returns `None` for strings this encoder would never produce.
    pub fn decode(&self, code: &str) -> Option<Vec<u64>> {
        let numbers = self.sqids.decode(code);
        if numbers.is_empty() {
            return None;
        }
        // Sqids decodes some foreign strings too; only canonical ones round-trip.
        match self.sqids.encode(&numbers) {
            Ok(canonical) if canonical == code => Some(numbers),
            _ => None,
        }
    }
}

impl Default for ShortCodeEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHABET, DEFAULT_MIN_LENGTH).expect("default alphabet is valid")
    }
}

/// Generates a random mixed-case alphanumeric short code.
///
/// The space is 62^8 codes, so probing for a free one rarely takes more than
/// one draw.
pub fn generate_random_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns true if `code` would shadow a top-level route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// Validates a user-provided alias.
///
/// # Rules
///
/// - Length: 5-10 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Unprocessable`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_alias("my-link").is_ok());
/// assert!(validate_alias("abcd").is_err());        // Too short
/// assert!(validate_alias("health").is_err());      // Reserved
/// ```
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    let len = alias.chars().count();

    if !(ALIAS_MIN_LENGTH..=ALIAS_MAX_LENGTH).contains(&len) {
        return Err(AppError::unprocessable(
            "alias length out of range",
            json!({
                "min_length": ALIAS_MIN_LENGTH,
                "max_length": ALIAS_MAX_LENGTH,
                "provided_length": len,
            }),
        ));
    }

    if !ALIAS_REGEX.is_match(alias) {
        return Err(AppError::unprocessable(
            "alias can only contain letters, digits, hyphens and underscores",
            json!({ "alias": alias }),
        ));
    }

    if is_reserved_code(alias) {
        return Err(AppError::unprocessable(
            "alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
