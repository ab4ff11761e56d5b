//! Position bookkeeping shared by the store backends.
//!
//! Every parent scope (a user's lists, a list's todos) keeps its children
//! at positions {0..n-1}. Inserts append at `n`, deletes close the gap,
//! moves close the old slot and open the new one. These helpers keep the
//! index arithmetic in one place.

/// Position a freshly inserted sibling takes: the current sibling count.
pub fn append_position(sibling_count: usize) -> i64 {
    sibling_count as i64
}

/// Clamps a requested move target to the valid index range. The count
/// includes the entity being moved.
pub fn clamp_target(sibling_count: usize, requested: usize) -> usize {
    if sibling_count == 0 {
        0
    } else {
        requested.min(sibling_count - 1)
    }
}

/// True when `positions` (sorted ascending) is exactly {0..n-1}.
pub fn is_packed(positions: &[i64]) -> bool {
    positions
        .iter()
        .enumerate()
        .all(|(i, &p)| p == i as i64)
}
