//! Human-readable ticket numbers: `PREFIX-TIMESTAMP36-RANDOM4`.
//!
//! The prefix is derived from the feedback type, the middle part is the
//! Unix time in milliseconds in upper-case base 36, and the suffix is four
//! random base-36 characters.

use rand::Rng;

use crate::feedback::{TYPE_BUG, TYPE_SUGGESTION};
use crate::types::Timestamp;

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 4;

/// Ticket prefix for a feedback type.
pub fn prefix_for_type(kind: &str) -> &'static str {
    match kind.trim().to_ascii_lowercase().as_str() {
        TYPE_BUG => "BUG",
        TYPE_SUGGESTION => "SUG",
        _ => "SUP",
    }
}

/// Encode `value` in upper-case base 36.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Build a ticket number with an explicit random source.
pub fn generate_with<R: Rng + ?Sized>(kind: &str, now: Timestamp, rng: &mut R) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36_DIGITS[rng.random_range(0..BASE36_DIGITS.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix_for_type(kind), to_base36(millis), suffix)
}

/// Build a ticket number for `kind` at the current time.
pub fn generate(kind: &str) -> String {
    generate_with(kind, chrono::Utc::now(), &mut rand::rng())
}
