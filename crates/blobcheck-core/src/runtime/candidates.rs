// crates/blobcheck-core/src/runtime/candidates.rs
// ============================================================================
// Module: Candidate Generator
// Description: Power-set enumeration of boolean storage toggles.
// Purpose: Produce candidate destinations lazily for discovery.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Every subset of the toggle list becomes one candidate. A toggle in the
//! subset is flipped relative to the base parameters: `"true"` in the base
//! becomes `"false"`, anything else (including absent) becomes `"true"`.
//! Toggles outside the subset keep their base value.
//!
//! Candidates are ordered by subset size, then by declared toggle order, so
//! the unmodified baseline always comes first. Only parameter values are
//! built here; no network calls happen until a candidate is probed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Destination;
use crate::core::ParamKey;

// ============================================================================
// SECTION: Toggles
// ============================================================================

/// Boolean toggles explored by discovery, in declared order.
pub const DEFAULT_TOGGLES: [ParamKey; 3] =
    [ParamKey::SkipChecksum, ParamKey::SkipTlsVerify, ParamKey::UsePathStyle];

/// Returns the value a toggle takes when flipped against `current`.
#[must_use]
pub fn flipped(current: Option<&str>) -> &'static str {
    if current == Some("true") { "false" } else { "true" }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Lazy, restartable sequence of candidate destinations.
///
/// # Invariants
/// - Yields exactly `2^toggles.len()` candidates.
/// - The first candidate carries the base parameters unchanged.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    /// Base destination every candidate is derived from.
    base: Destination,
    /// Toggles to flip, in declared order.
    toggles: Vec<ParamKey>,
    /// Subset bitmasks in emission order.
    masks: Vec<u32>,
    /// Index of the next mask to emit.
    cursor: usize,
}

impl CandidateGenerator {
    /// Builds a generator over [`DEFAULT_TOGGLES`].
    #[must_use]
    pub fn new(base: Destination) -> Self {
        Self::with_toggles(base, &DEFAULT_TOGGLES)
    }

    /// Builds a generator over an explicit toggle list.
    ///
    /// Duplicate toggles are ignored after their first occurrence.
    #[must_use]
    pub fn with_toggles(base: Destination, toggles: &[ParamKey]) -> Self {
        let mut unique: Vec<ParamKey> = Vec::with_capacity(toggles.len());
        for toggle in toggles {
            if !unique.contains(toggle) {
                unique.push(*toggle);
            }
        }
        let masks = subset_order(unique.len());
        Self {
            base,
            toggles: unique,
            masks,
            cursor: 0,
        }
    }

    /// Returns the total number of candidates.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.masks.len()
    }

    /// Rewinds to the baseline candidate.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Builds the candidate for one subset mask.
    fn build(&self, mask: u32) -> Destination {
        let mut params = self.base.params().clone();
        for (bit, toggle) in self.toggles.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                let value = flipped(self.base.params().get(*toggle));
                params.insert(*toggle, value);
            }
        }
        self.base.with_params(params)
    }
}

impl Iterator for CandidateGenerator {
    type Item = Destination;

    fn next(&mut self) -> Option<Self::Item> {
        let mask = *self.masks.get(self.cursor)?;
        self.cursor += 1;
        Some(self.build(mask))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.masks.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidateGenerator {}

/// Returns every subset mask of `count` bits, ordered by popcount and then by
/// mask value. Bit `i` stands for the `i`-th declared toggle.
fn subset_order(count: usize) -> Vec<u32> {
    let total = 1u32 << count;
    let mut masks: Vec<u32> = (0 .. total).collect();
    masks.sort_by_key(|mask| (mask.count_ones(), *mask));
    masks
}

#[cfg(test)]
mod tests {
    use super::subset_order;

    #[test]
    fn subset_order_groups_by_size_in_declared_order() {
        assert_eq!(subset_order(3), vec![0b000, 0b001, 0b010, 0b100, 0b011, 0b101, 0b110, 0b111]);
    }

    #[test]
    fn subset_order_of_zero_toggles_is_baseline_only() {
        assert_eq!(subset_order(0), vec![0]);
    }
}
