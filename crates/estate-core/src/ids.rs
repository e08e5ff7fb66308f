//! # Error and Session Identifiers
//!
//! Error ids are `<category>_<hash>` where the hash is a non-cryptographic
//! 32-bit rolling multiply-add over the message and a millisecond timestamp
//! salt. Collisions are tolerated: ids key the in-memory store and group
//! repeats in the top-errors list, nothing more.
//!
//! Session ids are `session_<timestamp>_<random>` and are minted once per
//! reporting service.

use crate::record::ErrorCategory;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random suffix in session ids.
const SESSION_SUFFIX_LEN: usize = 9;

/// 32-bit rolling hash (`h = h * 31 + c`) over UTF-16 code units.
///
/// Uses signed wrapping arithmetic and returns the magnitude, so the same
/// input always yields the same value on every platform.
#[must_use]
pub fn rolling_hash(input: &str) -> u32 {
    let hash = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs()
}

/// Render a value in lowercase base 36.
#[must_use]
pub fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Derive an error id from category, message and a millisecond timestamp.
#[must_use]
pub fn error_id(category: ErrorCategory, message: &str, timestamp_ms: u64) -> String {
    let hash = rolling_hash(&format!("{message}{timestamp_ms}"));
    format!("{}_{}", category.as_str(), to_base36(hash))
}

/// Mint a session id using the thread-local RNG.
#[must_use]
pub fn session_id(now_ms: u64) -> String {
    session_id_with(now_ms, &mut rand::thread_rng())
}

/// Mint a session id with an explicit RNG.
pub fn session_id_with<R: Rng + ?Sized>(now_ms: u64, rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("session_{now_ms}_{suffix}")
}
