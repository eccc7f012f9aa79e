//! Beam Search Algorithm
//!
//! 1. Start from a single empty hypothesis
//! 2. For each input position:
//!    a. Ask the classifier for a distribution for every live hypothesis
//!    b. Extend each hypothesis by its `size` most probable valid outcomes
//!    c. Keep only the `size` best extensions
//! 3. Return the survivors of the last position, best first

use tracing::trace;

use super::config::BeamConfig;
use super::heap::BoundedHeap;
use super::sequence::ScoredSequence;
use crate::model::Classifier;
use crate::utils::ranked;

/// Features for predicting the outcome at `index`, given the outcomes chosen
/// so far and any caller-supplied context
pub trait SequenceContextGenerator<T> {
  fn context(&self, index: usize, input: &[T], history: &[String], extra: &[String]) -> Vec<String>;
}

impl<T, F> SequenceContextGenerator<T> for F
where
  F: Fn(usize, &[T], &[String], &[String]) -> Vec<String>,
{
  fn context(&self, index: usize, input: &[T], history: &[String], extra: &[String]) -> Vec<String> {
    self(index, input, history, extra)
  }
}

/// Vetoes outcomes regardless of their probability, e.g. an `I-NP` chunk tag
/// that doesn't follow a `B-NP` or `I-NP`
pub trait SequenceValidator<T> {
  fn is_valid(&self, index: usize, input: &[T], history: &[String], outcome: &str) -> bool {
    let _ = (index, input, history, outcome);
    true
  }
}

/// Accepts every outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T> SequenceValidator<T> for AcceptAll {}

pub struct BeamSearch<G, M, V = AcceptAll> {
  config: BeamConfig,
  context: G,
  model: M,
  validator: V,
}

impl<G, M> BeamSearch<G, M> {
  pub fn new(config: BeamConfig, context: G, model: M) -> Self {
    assert!(config.size > 0, "beam size must be positive");
    Self {
      config,
      context,
      model,
      validator: AcceptAll,
    }
  }
}

impl<G, M, V> BeamSearch<G, M, V> {
  pub fn with_validator<W>(self, validator: W) -> BeamSearch<G, M, W> {
    BeamSearch {
      config: self.config,
      context: self.context,
      model: self.model,
      validator,
    }
  }

  pub fn config(&self) -> &BeamConfig {
    &self.config
  }

  /// Up to `k` best outcome sequences for `input`, best first. May return
  /// fewer, even none, if the validator or the score floor kills every
  /// hypothesis.
  pub fn best_sequences<T>(&self, k: usize, input: &[T], extra: &[String]) -> Vec<ScoredSequence>
  where
    G: SequenceContextGenerator<T>,
    M: Classifier,
    V: SequenceValidator<T>,
  {
    let size = self.config.size;
    let mut prev = BoundedHeap::new(size);
    prev.push(0.0, ScoredSequence::new());

    for index in 0..input.len() {
      let mut next = BoundedHeap::new(size);

      for (_, top) in prev.into_sorted_vec() {
        let history = top.outcomes();
        let context = self.context.context(index, input, &history, extra);
        let probs = self.model.evaluate(&context);

        // only the `size` most probable outcomes are ever expanded
        for outcome in ranked(&probs).into_iter().take(size) {
          let name = self.model.outcome(outcome);
          if !self.validator.is_valid(index, input, &history, name) {
            continue;
          }
          let extended = top.extend(name, probs[outcome]);
          if extended.score() > self.config.min_sequence_score {
            next.push(extended.score(), extended);
          }
        }
      }

      trace!(index, live = next.len(), "beam advanced");
      prev = next;
      if prev.is_empty() {
        break;
      }
    }

    prev
      .into_sorted_vec()
      .into_iter()
      .take(k)
      .map(|(_, seq)| seq)
      .collect()
  }

  /// The single best sequence, if any survives
  pub fn best_sequence<T>(&self, input: &[T], extra: &[String]) -> Option<ScoredSequence>
  where
    G: SequenceContextGenerator<T>,
    M: Classifier,
    V: SequenceValidator<T>,
  {
    self.best_sequences(1, input, extra).into_iter().next()
  }
}
