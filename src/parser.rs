use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::beam::BoundedHeap;
use crate::context::{AttachContextGenerator, BuildContextGenerator, DefaultContext};
use crate::derivation::{Derivation, TaggedToken};
use crate::head_rules::{HeadRules, HeadTable};
use crate::model::Classifier;
use crate::node::ParseNode;
use crate::outcome::{AttachModel, AttachOutcome, BuildModel, BuildOutcome};
use crate::syntree::SynTree;
use crate::utils::{ranked, Err};

/// Part of speech tags treated as punctuation by default
pub const DEFAULT_PUNCTUATION: [&str; 5] = [".", ",", ":", "``", "''"];

#[derive(Debug, Clone)]
pub struct ParserConfig {
  /// Derivations kept between steps
  pub beam_size: usize,
  /// Share of the build distribution explored per step. Outcomes at or
  /// below `1 - prob_mass` are never taken.
  pub prob_mass: f64,
  /// Tags whose tokens are collapsed into their neighbours
  pub punctuation: HashSet<String>,
  /// A derivation gets this many steps per input token (plus a few) before
  /// the parser gives up on it
  pub max_steps_per_token: usize,
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self {
      beam_size: 20,
      prob_mass: 0.95,
      punctuation: DEFAULT_PUNCTUATION.iter().map(|p| p.to_string()).collect(),
      max_steps_per_token: 5,
    }
  }
}

impl ParserConfig {
  pub fn with_beam_size(beam_size: usize) -> Self {
    Self {
      beam_size,
      ..Self::default()
    }
  }
}

/// A complete parse: a TOP-rooted tree and the log probability of the
/// decisions that built it
#[derive(Debug, Clone)]
pub struct Parse {
  root: Rc<ParseNode>,
  log_prob: f64,
}

impl Parse {
  fn from_derivation(derivation: Derivation) -> Option<Self> {
    let log_prob = derivation.log_prob();
    derivation.root().cloned().map(|root| Self { root, log_prob })
  }

  pub fn root(&self) -> &ParseNode {
    &self.root
  }

  pub fn log_prob(&self) -> f64 {
    self.log_prob
  }

  pub fn prob(&self) -> f64 {
    self.log_prob.exp()
  }

  pub fn to_syntree(&self) -> SynTree<String, String> {
    self.root.to_syntree()
  }
}

impl fmt::Display for Parse {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.root)
  }
}

/// A shift-reduce style parser: every step either wraps the leftmost
/// unfinished node in a new parent (build), or declares it finished and
/// hangs it somewhere on the right edge of the tree to its left (attach).
pub struct Parser {
  build: BuildModel<Box<dyn Classifier>>,
  attach: AttachModel<Box<dyn Classifier>>,
  head_rules: Box<dyn HeadRules>,
  build_context: Box<dyn BuildContextGenerator>,
  attach_context: Box<dyn AttachContextGenerator>,
  config: ParserConfig,
}

impl Parser {
  /// Fails if the build model has no DONE outcome, or the attach model is
  /// missing one of the attach outcomes
  pub fn new<B, A>(build_model: B, attach_model: A) -> Result<Self, Err>
  where
    B: Classifier + 'static,
    A: Classifier + 'static,
  {
    let build_model: Box<dyn Classifier> = Box::new(build_model);
    let attach_model: Box<dyn Classifier> = Box::new(attach_model);

    Ok(Self {
      build: BuildModel::new(build_model)?,
      attach: AttachModel::new(attach_model)?,
      head_rules: Box::new(HeadTable::english()),
      build_context: Box::new(DefaultContext),
      attach_context: Box::new(DefaultContext),
      config: ParserConfig::default(),
    })
  }

  pub fn with_head_rules(mut self, rules: impl HeadRules + 'static) -> Self {
    self.head_rules = Box::new(rules);
    self
  }

  pub fn with_build_context(mut self, context: impl BuildContextGenerator + 'static) -> Self {
    self.build_context = Box::new(context);
    self
  }

  pub fn with_attach_context(mut self, context: impl AttachContextGenerator + 'static) -> Self {
    self.attach_context = Box::new(context);
    self
  }

  pub fn with_config(mut self, config: ParserConfig) -> Self {
    assert!(config.beam_size > 0, "beam size must be positive");
    assert!(
      config.prob_mass > 0.0 && config.prob_mass <= 1.0,
      "prob mass {} must be in (0, 1]",
      config.prob_mass
    );
    self.config = config;
    self
  }

  pub fn config(&self) -> &ParserConfig {
    &self.config
  }

  /// The starting derivation for `tokens`
  pub fn start(&self, tokens: &[TaggedToken]) -> Result<Derivation, Err> {
    Derivation::from_tagged(tokens, &*self.head_rules, &self.config.punctuation)
  }

  /// Up to `n` parses of `tokens`, best first. An empty result means no
  /// parse was found.
  pub fn parse(&self, tokens: &[TaggedToken], n: usize) -> Result<Vec<Parse>, Err> {
    let start = self.start(tokens)?;
    Ok(self.parse_derivation(start, n))
  }

  pub fn parse_best(&self, tokens: &[TaggedToken]) -> Result<Option<Parse>, Err> {
    Ok(self.parse(tokens, 1)?.into_iter().next())
  }

  /// Runs the beam from an arbitrary starting derivation
  pub fn parse_derivation(&self, start: Derivation, n: usize) -> Vec<Parse> {
    if n == 0 {
      return Vec::new();
    }
    if start.is_complete() {
      return Parse::from_derivation(start).into_iter().collect();
    }

    let len = start.nodes().iter().map(|node| node.tokens().len()).sum::<usize>();
    let max_steps = self.config.max_steps_per_token * len + 3;

    let mut complete = BoundedHeap::new(n);
    let mut pending = vec![start];
    let mut steps = 0;

    while !pending.is_empty() && steps < max_steps {
      if complete.len() == n {
        // log probabilities only go down, so nothing pending can improve
        // on a full result set once it's behind the worst of it
        let best_pending = pending
          .iter()
          .map(|d| d.log_prob())
          .fold(f64::NEG_INFINITY, f64::max);
        if complete.worst_score().is_some_and(|worst| best_pending <= worst) {
          break;
        }
      }

      steps += 1;
      let mut next = BoundedHeap::new(self.config.beam_size);
      for derivation in pending.iter() {
        for successor in self.advance(derivation) {
          if successor.is_complete() {
            complete.push(successor.log_prob(), successor);
          } else {
            next.push(successor.log_prob(), successor);
          }
        }
      }

      debug!(
        step = steps,
        pending = next.len(),
        complete = complete.len(),
        best = ?next.best_score(),
        "parser step"
      );
      pending = next.into_sorted_vec().into_iter().map(|(_, d)| d).collect();
    }

    if complete.is_empty() {
      warn!(steps, tokens = len, "no parse found");
    }

    complete
      .into_sorted_vec()
      .into_iter()
      .filter_map(|(_, d)| Parse::from_derivation(d))
      .collect()
  }

  /// Every successor of `derivation` after one build or attach decision.
  /// `derivation` itself is left untouched.
  pub fn advance(&self, derivation: &Derivation) -> Vec<Derivation> {
    assert!(!derivation.is_complete(), "derivation is already complete");

    let rules = &*self.head_rules;
    if derivation.ready_for_top() {
      let mut top = derivation.clone();
      top.promote(rules);
      trace!(log_prob = top.log_prob(), "promoted to top");
      return vec![top];
    }

    let index = derivation
      .advance_index()
      .expect("a derivation that isn't ready for top has an unbuilt node");
    let prob_mass = self.config.prob_mass;
    let q = 1.0 - prob_mass;
    let mut successors = Vec::new();

    let context = self.build_context.build_context(derivation.nodes(), index);
    let probs = self.build.evaluate(&context);
    let done_prob = probs[self.build.done_index()];

    if 1.0 - done_prob > q {
      let mut mass = 0.0;
      for outcome in ranked(&probs) {
        let p = probs[outcome];
        if mass >= prob_mass || p <= 0.0 {
          break;
        }
        mass += p;

        if let BuildOutcome::Label(label) = self.build.outcome(outcome) {
          let mut built = derivation.clone();
          built.build(index, label, rules);
          built.add_log_prob(p.ln());
          trace!(index, label = %label, p, "build");
          successors.push(built);
        }
      }
    }

    if done_prob > q {
      let mut done = derivation.clone();
      done.mark_built(index);
      done.add_log_prob(done_prob.ln());

      let frontier = derivation.right_frontier();
      if index == 0 || frontier.is_empty() {
        trace!(index, p = done_prob, "done");
        successors.push(done);
        return successors;
      }

      for site in 0..frontier.len() {
        let context = self
          .attach_context
          .attach_context(derivation.nodes(), index, &frontier, site);
        let scores = self.attach.evaluate(&context);

        for outcome in [AttachOutcome::Daughter, AttachOutcome::Sister] {
          let p = scores.prob(outcome);
          if p <= q || (outcome == AttachOutcome::Daughter && frontier[site].is_chunk()) {
            continue;
          }

          let mut attached = done.clone();
          match outcome {
            AttachOutcome::Daughter => attached.attach_daughter(index, frontier.len(), site, rules),
            AttachOutcome::Sister => attached.attach_sister(index, frontier.len(), site, rules),
            AttachOutcome::NonAttach => unreachable!(),
          }
          attached.add_log_prob(p.ln());
          trace!(index, site = %frontier[site].label(), outcome = %outcome, p, "attach");
          successors.push(attached);
        }
      }
    }

    successors
  }
}
