//! Closed outcome types for the two parser decisions, and wrappers that
//! resolve a classifier's outcome names into them once, up front.

use std::fmt;
use std::str::FromStr;

use crate::model::Classifier;
use crate::utils::Err;

/// Build outcome meaning "do not build a parent over this node"
pub const DONE: &str = "DONE";
pub const ATTACH_SISTER: &str = "ATTACH_SISTER";
pub const ATTACH_DAUGHTER: &str = "ATTACH_DAUGHTER";
pub const NON_ATTACH: &str = "NON_ATTACH";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildOutcome {
  Done,
  /// Wrap the node in a new constituent with this label
  Label(String),
}

impl From<&str> for BuildOutcome {
  fn from(name: &str) -> Self {
    if name == DONE {
      Self::Done
    } else {
      Self::Label(name.to_string())
    }
  }
}

impl fmt::Display for BuildOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Done => write!(f, "{}", DONE),
      Self::Label(l) => write!(f, "{}", l),
    }
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttachOutcome {
  Sister,
  Daughter,
  NonAttach,
}

impl AttachOutcome {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Sister => ATTACH_SISTER,
      Self::Daughter => ATTACH_DAUGHTER,
      Self::NonAttach => NON_ATTACH,
    }
  }
}

impl FromStr for AttachOutcome {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      ATTACH_SISTER => Ok(Self::Sister),
      ATTACH_DAUGHTER => Ok(Self::Daughter),
      NON_ATTACH => Ok(Self::NonAttach),
      _ => Err(format!("unknown attach outcome {}", s).into()),
    }
  }
}

impl fmt::Display for AttachOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// A classifier over the build alphabet
pub struct BuildModel<M> {
  model: M,
  outcomes: Vec<BuildOutcome>,
  done: usize,
}

impl<M: Classifier> BuildModel<M> {
  /// Fails if the model has no DONE outcome
  pub fn new(model: M) -> Result<Self, Err> {
    let done = model
      .index_of(DONE)
      .ok_or_else(|| format!("build model has no {} outcome", DONE))?;
    let outcomes = (0..model.num_outcomes())
      .map(|idx| BuildOutcome::from(model.outcome(idx)))
      .collect();

    Ok(Self {
      model,
      outcomes,
      done,
    })
  }

  pub fn evaluate(&self, context: &[String]) -> Vec<f64> {
    let probs = self.model.evaluate(context);
    debug_assert_eq!(probs.len(), self.outcomes.len(), "build distribution size");
    probs
  }

  pub fn outcome(&self, index: usize) -> &BuildOutcome {
    &self.outcomes[index]
  }

  pub fn done_index(&self) -> usize {
    self.done
  }
}

/// Probabilities of the three attach outcomes for one frontier site
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttachScores {
  pub sister: f64,
  pub daughter: f64,
  pub non_attach: f64,
}

impl AttachScores {
  pub fn prob(&self, outcome: AttachOutcome) -> f64 {
    match outcome {
      AttachOutcome::Sister => self.sister,
      AttachOutcome::Daughter => self.daughter,
      AttachOutcome::NonAttach => self.non_attach,
    }
  }
}

/// A classifier over the attach alphabet
pub struct AttachModel<M> {
  model: M,
  sister: usize,
  daughter: usize,
  non_attach: usize,
}

impl<M: Classifier> AttachModel<M> {
  /// Fails unless the model knows all three attach outcomes
  pub fn new(model: M) -> Result<Self, Err> {
    let index = |name: &str| -> Result<usize, Err> {
      model
        .index_of(name)
        .ok_or_else(|| format!("attach model has no {} outcome", name).into())
    };
    let sister = index(ATTACH_SISTER)?;
    let daughter = index(ATTACH_DAUGHTER)?;
    let non_attach = index(NON_ATTACH)?;

    Ok(Self {
      model,
      sister,
      daughter,
      non_attach,
    })
  }

  pub fn evaluate(&self, context: &[String]) -> AttachScores {
    let probs = self.model.evaluate(context);
    AttachScores {
      sister: probs[self.sister],
      daughter: probs[self.daughter],
      non_attach: probs[self.non_attach],
    }
  }
}
