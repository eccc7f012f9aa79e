use std::collections::HashMap;
use std::rc::Rc;

use crate::utils::{check_distribution, Err};

/// A trained scoring model: maps a feature context to a probability
/// distribution over a fixed outcome alphabet.
pub trait Classifier {
  /// Distribution over all outcomes, indexed like `outcome`
  fn evaluate(&self, context: &[String]) -> Vec<f64>;

  fn outcome(&self, index: usize) -> &str;

  fn index_of(&self, outcome: &str) -> Option<usize>;

  fn num_outcomes(&self) -> usize;
}

impl<C: Classifier + ?Sized> Classifier for &C {
  fn evaluate(&self, context: &[String]) -> Vec<f64> {
    (**self).evaluate(context)
  }

  fn outcome(&self, index: usize) -> &str {
    (**self).outcome(index)
  }

  fn index_of(&self, outcome: &str) -> Option<usize> {
    (**self).index_of(outcome)
  }

  fn num_outcomes(&self) -> usize {
    (**self).num_outcomes()
  }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
  fn evaluate(&self, context: &[String]) -> Vec<f64> {
    (**self).evaluate(context)
  }

  fn outcome(&self, index: usize) -> &str {
    (**self).outcome(index)
  }

  fn index_of(&self, outcome: &str) -> Option<usize> {
    (**self).index_of(outcome)
  }

  fn num_outcomes(&self) -> usize {
    (**self).num_outcomes()
  }
}

impl<C: Classifier + ?Sized> Classifier for Rc<C> {
  fn evaluate(&self, context: &[String]) -> Vec<f64> {
    (**self).evaluate(context)
  }

  fn outcome(&self, index: usize) -> &str {
    (**self).outcome(index)
  }

  fn index_of(&self, outcome: &str) -> Option<usize> {
    (**self).index_of(outcome)
  }

  fn num_outcomes(&self) -> usize {
    (**self).num_outcomes()
  }
}

#[derive(Debug, Clone)]
struct LookupRule {
  features: Vec<String>,
  probs: Vec<f64>,
}

/// A classifier given as a table: the first rule whose features all appear
/// in the context decides the distribution, otherwise the default one is used.
///
/// ```
/// use beamtree::model::{Classifier, LookupModel};
///
/// let model = LookupModel::new(["DONE", "NP"])
///   .with_default(&[("DONE", 1.0)])
///   .unwrap()
///   .with_rule(&["t0=DT"], &[("NP", 0.9), ("DONE", 0.1)])
///   .unwrap();
///
/// assert_eq!(model.evaluate(&["t0=DT".to_string()]), vec![0.1, 0.9]);
/// assert_eq!(model.evaluate(&["t0=NN".to_string()]), vec![1.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct LookupModel {
  outcomes: Vec<String>,
  index: HashMap<String, usize>,
  default: Vec<f64>,
  rules: Vec<LookupRule>,
}

impl LookupModel {
  /// Starts with a uniform default distribution over `outcomes`
  pub fn new<I, S>(outcomes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let outcomes = outcomes.into_iter().map(Into::into).collect::<Vec<String>>();
    let index = outcomes
      .iter()
      .enumerate()
      .map(|(idx, o)| (o.clone(), idx))
      .collect::<HashMap<_, _>>();
    let default = vec![1.0 / outcomes.len().max(1) as f64; outcomes.len()];

    Self {
      outcomes,
      index,
      default,
      rules: Vec::new(),
    }
  }

  /// Replaces the default distribution. Unlisted outcomes get 0.
  pub fn with_default(mut self, probs: &[(&str, f64)]) -> Result<Self, Err> {
    self.default = self.distribution(probs)?;
    Ok(self)
  }

  /// Adds a rule that fires when every one of `features` is in the context.
  /// Rules are tried in the order they were added.
  pub fn with_rule(mut self, features: &[&str], probs: &[(&str, f64)]) -> Result<Self, Err> {
    let probs = self.distribution(probs)?;
    self.rules.push(LookupRule {
      features: features.iter().map(|f| f.to_string()).collect(),
      probs,
    });
    Ok(self)
  }

  fn distribution(&self, probs: &[(&str, f64)]) -> Result<Vec<f64>, Err> {
    let mut dist = vec![0.0; self.outcomes.len()];
    for (outcome, p) in probs {
      let idx = self
        .index_of(outcome)
        .ok_or_else(|| format!("unknown outcome {}", outcome))?;
      dist[idx] = *p;
    }
    check_distribution(&dist)?;
    Ok(dist)
  }
}

impl Classifier for LookupModel {
  fn evaluate(&self, context: &[String]) -> Vec<f64> {
    self
      .rules
      .iter()
      .find(|rule| rule.features.iter().all(|f| context.contains(f)))
      .map(|rule| rule.probs.clone())
      .unwrap_or_else(|| self.default.clone())
  }

  fn outcome(&self, index: usize) -> &str {
    &self.outcomes[index]
  }

  fn index_of(&self, outcome: &str) -> Option<usize> {
    self.index.get(outcome).copied()
  }

  fn num_outcomes(&self) -> usize {
    self.outcomes.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx(features: &[&str]) -> Vec<String> {
    features.iter().map(|f| f.to_string()).collect()
  }

  #[test]
  fn test_uniform_default() {
    let model = LookupModel::new(["a", "b", "c", "d"]);
    assert_eq!(model.evaluate(&[]), vec![0.25; 4]);
    assert_eq!(model.num_outcomes(), 4);
    assert_eq!(model.outcome(2), "c");
    assert_eq!(model.index_of("d"), Some(3));
    assert_eq!(model.index_of("e"), None);
  }

  #[test]
  fn test_conjunctive_rules_in_order() {
    let model = LookupModel::new(["x", "y"])
      .with_rule(&["f1", "f2"], &[("x", 1.0)])
      .unwrap()
      .with_rule(&["f1"], &[("y", 1.0)])
      .unwrap();

    assert_eq!(model.evaluate(&ctx(&["f2", "f1"])), vec![1.0, 0.0]);
    assert_eq!(model.evaluate(&ctx(&["f1"])), vec![0.0, 1.0]);
    assert_eq!(model.evaluate(&ctx(&["f2"])), vec![0.5, 0.5]);
  }

  #[test]
  fn test_bad_distributions() {
    assert!(LookupModel::new(["x", "y"]).with_default(&[("z", 1.0)]).is_err());
    assert!(LookupModel::new(["x", "y"]).with_default(&[("x", 0.3)]).is_err());
    assert!(LookupModel::new(["x", "y"]).with_rule(&["f"], &[("x", 0.6), ("y", 0.6)]).is_err());
  }

  #[test]
  fn test_through_pointers() {
    let model: Box<dyn Classifier> = Box::new(LookupModel::new(["x"]));
    assert_eq!(model.evaluate(&[]), vec![1.0]);
    let shared = Rc::new(LookupModel::new(["x", "y"]));
    assert_eq!(shared.num_outcomes(), 2);
  }
}
