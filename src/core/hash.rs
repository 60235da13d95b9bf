//! Content hashing for suggestion ids and dedupe keys.
//!
//! Deterministic and fast, not cryptographic. Identical input text always
//! yields the same token, which is what keeps persisted selection state
//! re-attachable after a page is rescanned.

use xxhash_rust::xxh64::xxh64;

/// Hash `text` into a compact base36 token.
pub fn content_hash(text: &str) -> String {
    to_base36(xxh64(text.as_bytes(), 0))
}

/// Lowercase base36 rendering of a 64-bit value.
fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    // 13 digits is enough for u64::MAX in base36
    let mut buf = [0u8; 13];
    let mut i = buf.len();

    while n > 0 {
        i -= 1;
        buf[i] = DIGITS[(n % 36) as usize];
        n /= 36;
    }

    // Buffer only ever holds ASCII digits
    String::from_utf8_lossy(&buf[i..]).into_owned()
}
