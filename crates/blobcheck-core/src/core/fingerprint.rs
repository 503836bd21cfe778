// crates/blobcheck-core/src/core/fingerprint.rs
// ============================================================================
// Module: Table Fingerprints
// Description: Order-independent SHA-256 digests over key/value rows.
// Purpose: Compare table contents without depending on row order.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Each row is hashed on its own (length-prefixed key, then a presence tag
//! and the value) and the row digests are folded with XOR. The tag keeps a
//! NULL value distinct from an empty string. Rows in a key/value table have unique
//! keys, so the fold is a set digest: insertion order does not matter and
//! any changed, added, or missing row changes the result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Size of a SHA-256 digest in bytes.
const DIGEST_LEN: usize = 32;
/// Tag hashed for a NULL value.
const NULL_TAG: u8 = 0;
/// Tag hashed ahead of a present value.
const VALUE_TAG: u8 = 1;

/// Computes the order-independent fingerprint of key/value rows.
///
/// Values may be plain strings or `Option<&str>` where `None` is SQL NULL.
#[must_use]
pub fn fingerprint_rows<'a, I, V>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, V)>,
    V: Into<Option<&'a str>>,
{
    let mut folded = [0u8; DIGEST_LEN];
    for (key, value) in rows {
        let mut hasher = Sha256::new();
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(key.as_bytes());
        match value.into() {
            Some(value) => {
                hasher.update([VALUE_TAG]);
                hasher.update(value.as_bytes());
            }
            None => hasher.update([NULL_TAG]),
        }
        for (acc, byte) in folded.iter_mut().zip(hasher.finalize()) {
            *acc ^= byte;
        }
    }
    hex_encode(&folded)
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
