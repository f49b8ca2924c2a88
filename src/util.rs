use std::collections::HashSet;
use std::hash::Hash;

/// De-duplicates a slice, preserving first-occurrence order.
pub fn dedupe<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((*item).clone()))
        .cloned()
        .collect()
}
