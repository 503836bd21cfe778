// crates/blobcheck-core/tests/fingerprint.rs
// ============================================================================
// Module: Fingerprint Tests
// Description: Order independence and sensitivity of table fingerprints.
// Purpose: Ensure restored tables compare equal only when contents match.
// ============================================================================

//! Table fingerprint properties.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use blobcheck_core::fingerprint_rows;
use proptest::prelude::*;

fn rows_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z0-9-]{1,12}", ".{0,16}", 0 .. 32)
}

proptest! {
    #[test]
    fn shuffled_rows_fingerprint_equal(rows in rows_strategy(), seed in any::<u64>()) {
        let ordered: Vec<(&str, &str)> =
            rows.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let mut shuffled = ordered.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            let shift = usize::try_from(seed % len as u64).unwrap();
            shuffled.rotate_left(shift);
            shuffled.reverse();
        }
        prop_assert_eq!(fingerprint_rows(ordered), fingerprint_rows(shuffled));
    }

    #[test]
    fn changed_value_changes_fingerprint(rows in rows_strategy()) {
        prop_assume!(!rows.is_empty());
        let original = fingerprint_rows(rows.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let mut changed = rows.clone();
        if let Some(value) = changed.values_mut().next() {
            value.push('!');
        }
        let altered = fingerprint_rows(changed.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        prop_assert_ne!(original, altered);
    }
}

#[test]
fn fingerprint_is_reflexive_and_hex() {
    let rows = [("run1-0", "a"), ("run1-1", "b")];
    let first = fingerprint_rows(rows);
    assert_eq!(first, fingerprint_rows(rows));
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn key_value_boundary_is_part_of_the_digest() {
    assert_ne!(fingerprint_rows([("ab", "c")]), fingerprint_rows([("a", "bc")]));
}

#[test]
fn missing_row_changes_fingerprint() {
    let full = fingerprint_rows([("k1", "v1"), ("k2", "v2")]);
    let partial = fingerprint_rows([("k1", "v1")]);
    assert_ne!(full, partial);
}

#[test]
fn null_value_differs_from_empty_string() {
    let null = fingerprint_rows([("k1", None::<&str>)]);
    let empty = fingerprint_rows([("k1", Some(""))]);
    assert_ne!(null, empty);
    assert_eq!(empty, fingerprint_rows([("k1", "")]));
}
