use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry<T> {
  score: f64,
  /// Insertion order, earlier wins ties
  order: u64,
  item: T,
}

impl<T> PartialEq for Entry<T> {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

/// Greater means better: higher score, then earlier insertion
impl<T> Ord for Entry<T> {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .score
      .total_cmp(&other.score)
      .then_with(|| other.order.cmp(&self.order))
  }
}

/// A priority structure that keeps only the `capacity` best-scoring items.
///
/// Items with equal scores are ranked by insertion order, so the outcome of a
/// search never depends on hash or allocation order.
#[derive(Debug)]
pub struct BoundedHeap<T> {
  capacity: usize,
  // min-heap on quality: the root is the worst entry, first to be evicted
  entries: BinaryHeap<Reverse<Entry<T>>>,
  inserted: u64,
}

impl<T> BoundedHeap<T> {
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "bounded heap needs a capacity");
    Self {
      capacity,
      entries: BinaryHeap::with_capacity(capacity + 1),
      inserted: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Offers an item. Returns false if it was not good enough to keep.
  pub fn push(&mut self, score: f64, item: T) -> bool {
    let entry = Entry {
      score,
      order: self.inserted,
      item,
    };
    self.inserted += 1;

    if self.entries.len() < self.capacity {
      self.entries.push(Reverse(entry));
      return true;
    }

    let better = self
      .entries
      .peek()
      .is_some_and(|Reverse(worst)| entry > *worst);
    if better {
      self.entries.pop();
      self.entries.push(Reverse(entry));
    }
    better
  }

  /// Score of the worst item kept
  pub fn worst_score(&self) -> Option<f64> {
    self.entries.peek().map(|Reverse(e)| e.score)
  }

  /// Score of the best item kept
  pub fn best_score(&self) -> Option<f64> {
    self
      .entries
      .iter()
      .map(|Reverse(e)| e)
      .max()
      .map(|e| e.score)
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  /// Drains into (score, item) pairs, best first
  pub fn into_sorted_vec(self) -> Vec<(f64, T)> {
    // ascending Reverse order is descending entry order
    self
      .entries
      .into_sorted_vec()
      .into_iter()
      .map(|Reverse(e)| (e.score, e.item))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_keeps_best() {
    let mut heap = BoundedHeap::new(3);
    for (score, item) in [(-1.0, "a"), (-5.0, "b"), (-0.5, "c"), (-2.0, "d"), (-9.0, "e")] {
      heap.push(score, item);
      assert!(heap.len() <= heap.capacity());
    }

    assert_eq!(heap.worst_score(), Some(-2.0));
    assert_eq!(heap.best_score(), Some(-0.5));
    let items = heap.into_sorted_vec().into_iter().map(|(_, i)| i).collect::<Vec<_>>();
    assert_eq!(items, vec!["c", "a", "d"]);
  }

  #[test]
  fn test_ties_keep_insertion_order() {
    let mut heap = BoundedHeap::new(2);
    assert!(heap.push(0.0, 1));
    assert!(heap.push(0.0, 2));
    // equal to the worst, but later: rejected
    assert!(!heap.push(0.0, 3));
    let items = heap.into_sorted_vec().into_iter().map(|(_, i)| i).collect::<Vec<_>>();
    assert_eq!(items, vec![1, 2]);
  }

  #[test]
  fn test_empty() {
    let mut heap: BoundedHeap<()> = BoundedHeap::new(1);
    assert!(heap.is_empty());
    assert_eq!(heap.best_score(), None);
    heap.push(1.0, ());
    heap.clear();
    assert!(heap.into_sorted_vec().is_empty());
  }

  #[test]
  #[should_panic]
  fn test_zero_capacity() {
    BoundedHeap::<()>::new(0);
  }
}
