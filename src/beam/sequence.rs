use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct Link {
  outcome: String,
  prob: f64,
  prev: Option<Rc<Link>>,
}

/// An outcome sequence with its cumulative log score.
///
/// Extending a sequence shares its prefix instead of copying it, so every
/// hypothesis in a beam costs one link per position.
#[derive(Debug, Clone, Default)]
pub struct ScoredSequence {
  last: Option<Rc<Link>>,
  score: f64,
  len: usize,
}

impl ScoredSequence {
  /// The empty sequence, with probability 1
  pub fn new() -> Self {
    Self::default()
  }

  /// A new sequence with `outcome` appended
  pub fn extend(&self, outcome: impl Into<String>, prob: f64) -> Self {
    Self {
      last: Some(Rc::new(Link {
        outcome: outcome.into(),
        prob,
        prev: self.last.clone(),
      })),
      score: self.score + prob.ln(),
      len: self.len + 1,
    }
  }

  /// Sum of the log probabilities of every outcome
  pub fn score(&self) -> f64 {
    self.score
  }

  pub fn prob(&self) -> f64 {
    self.score.exp()
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  fn links(&self) -> Vec<&Link> {
    let mut links = Vec::with_capacity(self.len);
    let mut link = self.last.as_deref();
    while let Some(l) = link {
      links.push(l);
      link = l.prev.as_deref();
    }
    links.reverse();
    links
  }

  pub fn outcomes(&self) -> Vec<String> {
    self.links().iter().map(|l| l.outcome.clone()).collect()
  }

  /// Probability of each outcome when it was chosen
  pub fn probs(&self) -> Vec<f64> {
    self.links().iter().map(|l| l.prob).collect()
  }
}

impl fmt::Display for ScoredSequence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.4} [{}]", self.score, self.outcomes().join(" "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_has_probability_one() {
    let seq = ScoredSequence::new();
    assert!(seq.is_empty());
    assert_eq!(seq.prob(), 1.0);
    assert!(seq.outcomes().is_empty());
  }

  #[test]
  fn test_extend_shares_prefix() {
    let base = ScoredSequence::new().extend("DT", 0.5);
    let a = base.extend("NN", 0.5);
    let b = base.extend("JJ", 0.25);

    assert_eq!(base.outcomes(), vec!["DT"]);
    assert_eq!(a.outcomes(), vec!["DT", "NN"]);
    assert_eq!(b.outcomes(), vec!["DT", "JJ"]);
    assert_eq!(b.probs(), vec![0.5, 0.25]);
    assert!((a.prob() - 0.25).abs() < 1e-12);
    assert!(b.score() < a.score());
    assert!(Rc::ptr_eq(
      a.last.as_ref().unwrap().prev.as_ref().unwrap(),
      b.last.as_ref().unwrap().prev.as_ref().unwrap()
    ));
    assert_eq!(format!("{}", ScoredSequence::new().extend("X", 1.0)), "0.0000 [X]");
  }
}
