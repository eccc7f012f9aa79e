use std::fmt;

/// Half-open interval `[start, end)` over token positions.
///
/// Ordered by start, then by end.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
  start: usize,
  end: usize,
}

impl Span {
  pub fn new(start: usize, end: usize) -> Self {
    assert!(start <= end, "span start {} is after end {}", start, end);
    Self { start, end }
  }

  /// Span of the single token at `index`
  pub fn token(index: usize) -> Self {
    Self::new(index, index + 1)
  }

  pub fn start(&self) -> usize {
    self.start
  }

  pub fn end(&self) -> usize {
    self.end
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn contains(&self, other: &Span) -> bool {
    self.start <= other.start && other.end <= self.end
  }

  pub fn contains_index(&self, index: usize) -> bool {
    self.start <= index && index < self.end
  }

  pub fn intersects(&self, other: &Span) -> bool {
    self.start < other.end && other.start < self.end
  }

  /// Smallest span containing both
  pub fn union(&self, other: &Span) -> Span {
    Span::new(self.start.min(other.start), self.end.max(other.end))
  }

  /// Smallest span containing every span in `spans`, or None if there are none
  pub fn covering<I>(spans: I) -> Option<Span>
  where
    I: IntoIterator<Item = Span>,
  {
    spans.into_iter().reduce(|acc, s| acc.union(&s))
  }
}

impl From<Span> for (usize, usize) {
  fn from(span: Span) -> Self {
    (span.start, span.end)
  }
}

impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}", self.start, self.end)
  }
}
