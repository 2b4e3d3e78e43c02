//! Identifier generation for tabs and fields.
//!
//! Ids are short, human-debuggable strings of the form `prefix_xxxxxxx`,
//! where the suffix is a base-36 token derived from a v4 UUID. Uniqueness is
//! probabilistic, not enforced: at the expected scale (tens to low thousands
//! of fields) collisions are negligible, and every id that enters the
//! document through the import path is regenerated anyway.

use uuid::Uuid;

const SUFFIX_LEN: usize = 7;

/// Generate a fresh id with the given prefix, e.g. `new_id("tab")` ->
/// `"tab_k3f9a1z"`. Each call is independent; there is no shared counter.
pub fn new_id(prefix: &str) -> String {
    let raw = u128::from_be_bytes(*Uuid::new_v4().as_bytes());
    let mut suffix = to_base36(raw);
    suffix.truncate(SUFFIX_LEN);
    format!("{}_{}", prefix, suffix)
}

fn to_base36(mut n: u128) -> String {
    let mut digits = Vec::new();
    loop {
        let d = (n % 36) as u32;
        digits.push(char::from_digit(d, 36).unwrap_or('0'));
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}
