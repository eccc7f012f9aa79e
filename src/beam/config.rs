//! Beam search configuration

/// Beam search configuration parameters
#[derive(Debug, Clone)]
pub struct BeamConfig {
  /// Number of hypotheses kept at each position, and number of outcomes
  /// tried per hypothesis
  ///
  /// Lower values = faster but less thorough
  pub size: usize,

  /// Extensions whose cumulative log score is not above this are dropped
  pub min_sequence_score: f64,
}

impl Default for BeamConfig {
  fn default() -> Self {
    Self {
      size: 3,
      min_sequence_score: -100000.0,
    }
  }
}

impl BeamConfig {
  pub fn with_size(size: usize) -> Self {
    Self {
      size,
      ..Self::default()
    }
  }

  /// Greedy decoding: one hypothesis, one outcome per position
  pub fn greedy() -> Self {
    Self::with_size(1)
  }
}
