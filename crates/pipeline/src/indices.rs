//! Predicate position extraction

use nlp_serve_common::{PredicateIndices, PredicateMask};

/// Positions whose flag is 1, in ascending order
#[must_use]
pub fn predicate_indices(mask: &PredicateMask) -> PredicateIndices {
    mask.iter()
        .enumerate()
        .filter_map(|(idx, &flag)| (flag == 1).then_some(idx))
        .collect()
}
