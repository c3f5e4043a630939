//! Top-K selection for grouped counts
//!
//! **Problem**: a top-N distribution over G groups via full sort is
//! O(G log G), and large free-text columns (`Medium`, `Artist Display Name`)
//! produce hundreds of thousands of groups.
//!
//! **Solution**: bounded min-heap selection, O(G log K).
//!
//! The result must be identical to sort-then-truncate, so keys are required
//! to be totally ordered. Callers break ties explicitly (e.g. by
//! first-encountered position) inside the key.

use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// Heap item with reversed ordering: the smallest retained key sits on top,
// ready to be evicted by a larger one.
#[derive(Debug)]
struct MinHeapItem<K> {
    key: K,
    index: usize,
}

impl<K: Ord> PartialEq for MinHeapItem<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord> Eq for MinHeapItem<K> {}

impl<K: Ord> Ord for MinHeapItem<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key.cmp(&self.key)
    }
}

impl<K: Ord> PartialOrd for MinHeapItem<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the `k` items with the largest keys, largest first
///
/// If `k >= items.len()` every item is returned, sorted.
///
/// # Errors
///
/// Returns error if `k` is zero
///
/// # Examples
///
/// ```rust
/// use museum_eda::topk::select_top_k;
///
/// let counts = vec![("Prints", 3), ("Drawings", 9), ("Textiles", 5)];
/// let top = select_top_k(counts, 2, |&(_, count)| count)?;
/// assert_eq!(top, vec![("Drawings", 9), ("Textiles", 5)]);
/// # Ok::<(), museum_eda::Error>(())
/// ```
pub fn select_top_k<T, K, F>(items: Vec<T>, k: usize, key: F) -> Result<Vec<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    if k == 0 {
        return Err(Error::InvalidInput("k must be greater than 0".to_string()));
    }

    if k >= items.len() {
        let mut all = items;
        all.sort_by(|a, b| key(b).cmp(&key(a)));
        return Ok(all);
    }

    let mut heap: BinaryHeap<MinHeapItem<K>> = BinaryHeap::with_capacity(k);
    for (index, item) in items.iter().enumerate() {
        let candidate = key(item);
        if heap.len() < k {
            heap.push(MinHeapItem { key: candidate, index });
        } else if let Some(top) = heap.peek() {
            if candidate > top.key {
                heap.pop();
                heap.push(MinHeapItem { key: candidate, index });
            }
        }
    }

    // into_sorted_vec is ascending under the reversed ordering: largest key first
    let mut selected: Vec<Option<T>> = items.into_iter().map(Some).collect();
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .filter_map(|item| selected.get_mut(item.index).and_then(Option::take))
        .collect())
}
