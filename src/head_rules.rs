//! Head percolation tables and a simple recursive-descent parser for them

use regex::Regex;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use crate::node::ParseNode;
use crate::Err;

/// Picks which child of a new or changed constituent is its head
pub trait HeadRules {
  /// Index into `children`, which is never empty
  fn head_of(&self, label: &str, children: &[Rc<ParseNode>]) -> usize;
}

impl<H: HeadRules + ?Sized> HeadRules for &H {
  fn head_of(&self, label: &str, children: &[Rc<ParseNode>]) -> usize {
    (**self).head_of(label, children)
  }
}

impl<H: HeadRules + ?Sized> HeadRules for Box<H> {
  fn head_of(&self, label: &str, children: &[Rc<ParseNode>]) -> usize {
    (**self).head_of(label, children)
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
  LeftToRight,
  RightToLeft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRule {
  pub direction: Direction,
  /// Child labels in priority order
  pub labels: Vec<String>,
}

impl HeadRule {
  fn scan_order(&self, len: usize) -> Vec<usize> {
    match self.direction {
      Direction::LeftToRight => (0..len).collect(),
      Direction::RightToLeft => (0..len).rev().collect(),
    }
  }

  fn apply(&self, children: &[Rc<ParseNode>]) -> usize {
    let order = self.scan_order(children.len());
    for label in self.labels.iter() {
      if let Some(&idx) = order.iter().find(|&&idx| children[idx].label() == label) {
        return idx;
      }
    }
    order[0]
  }
}

/// Table of head rules keyed by constituent label.
///
/// The text form is a list of `;`-terminated rules, `LABEL -> TAGS` to scan
/// children left to right, `LABEL <- TAGS` to scan right to left:
///
/// ```
/// use beamtree::head_rules::HeadTable;
///
/// let table: HeadTable = r#"
///   // nouns head noun phrases
///   NP <- NN NNS NNP NP;
///   VP -> VBD VBZ VB VP;
/// "#
/// .parse()
/// .unwrap();
///
/// assert_eq!(table.len(), 2);
/// ```
///
/// Labels without a rule take their first child as head.
#[derive(Debug, Clone, Default)]
pub struct HeadTable {
  rules: HashMap<String, HeadRule>,
}

pub const ENGLISH_HEAD_RULES: &str = r#"
  ADJP <- NNS QP NN $ ADVP JJ VBN VBG ADJP JJR NP JJS DT FW RBR RBS SBAR RB;
  ADVP -> RB RBR RBS FW ADVP TO CD JJR JJ IN NP JJS NN;
  CONJP -> CC RB IN;
  FRAG -> ;
  INTJ <- ;
  LST -> LS :;
  NAC <- NN NNS NNP NNPS NP NAC EX $ CD QP PRP VBG JJ JJS JJR ADJP FW;
  NP <- NN NNS NNP NNPS NX POS JJR NP CD PRP QP JJ JJS RB ADJP;
  NX <- ;
  PP -> IN TO VBG VBN RP FW;
  PRN <- ;
  PRT -> RP;
  QP <- $ IN NNS NN JJ RB DT CD NCD QP JJR JJS;
  RRC -> VP NP ADVP ADJP PP;
  S <- TO IN VP S SBAR ADJP UCP NP;
  SBAR <- WHNP WHPP WHADVP WHADJP IN DT S SQ SINV SBAR FRAG;
  SBARQ <- SQ S SINV SBARQ FRAG;
  SINV <- VBZ VBD VBP VB MD VP S SINV ADJP NP;
  SQ <- VBZ VBD VBP VB MD VP SQ;
  UCP -> ;
  VP -> TO VBD VBN MD VBZ VB VBG VBP VP ADJP NN NNS NP;
  WHADJP <- CC WRB JJ ADJP;
  WHADVP -> CC WRB;
  WHNP <- WDT WP WP$ WHADJP WHPP WHNP;
  WHPP -> IN TO FW;
  TOP -> S SINV SQ SBARQ FRAG NP VP;
"#;

impl HeadTable {
  /// The built-in English table, after Collins
  pub fn english() -> Self {
    ENGLISH_HEAD_RULES
      .parse()
      .expect("built-in head rules are well-formed")
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn rule(&self, label: &str) -> Option<&HeadRule> {
    self.rules.get(label)
  }

  pub fn insert(&mut self, label: impl Into<String>, rule: HeadRule) {
    self.rules.insert(label.into(), rule);
  }
}

impl HeadRules for HeadTable {
  fn head_of(&self, label: &str, children: &[Rc<ParseNode>]) -> usize {
    assert!(!children.is_empty(), "head of {} with no children", label);
    self.rules.get(label).map_or(0, |rule| rule.apply(children))
  }
}

impl FromStr for HeadTable {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut table = HeadTable::default();
    let mut s = skip_whitespace(s);
    while !s.is_empty() {
      let ((label, rule), rest) = parse_rule(s)?;
      table.insert(label, rule);
      s = skip_whitespace(rest);
    }
    Ok(table)
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str), Err>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

/// Try to consume a regex anchored at the start of `s`, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => (Some(m.as_str()), &s[m.end()..]),
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, s: &'a str, what: &str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("expected {} at {:?}", what, s.lines().next().unwrap_or("")).into())
  }
}

/// Skips whitespace, newlines, and // comments
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE_OR_COMMENT, r"(\s|//[^\n]*)+");
  optional_re(&*WHITESPACE_OR_COMMENT, s).1
}

/// Labels and tags: anything but whitespace, `;`, and the arrows
fn parse_label(s: &str) -> ParseResult<'_, &str> {
  regex_static!(LABEL, r"[^\s;<>]+");
  needed_re(&*LABEL, s, "label")
}

fn parse_direction(s: &str) -> ParseResult<'_, Direction> {
  regex_static!(ARROW, r"->|<-");
  let (arrow, s) = needed_re(&*ARROW, s, "-> or <-")?;
  let direction = if arrow == "->" {
    Direction::LeftToRight
  } else {
    Direction::RightToLeft
  };
  Ok((direction, s))
}

fn parse_rule(s: &str) -> ParseResult<'_, (String, HeadRule)> {
  let (label, s) = parse_label(s)?;
  let s = skip_whitespace(s);
  let (direction, s) = parse_direction(s).map_err(|e| format!("rule {}: {}", label, e))?;
  let mut s = skip_whitespace(s);

  let mut labels = Vec::new();
  loop {
    if let Some(rest) = s.strip_prefix(';') {
      s = rest;
      break;
    }
    let (tag, rest) = parse_label(s).map_err(|e| format!("rule {}: {}", label, e))?;
    labels.push(tag.to_string());
    s = skip_whitespace(rest);
  }

  Ok(((label.to_string(), HeadRule { direction, labels }), s))
}
