use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::frontier::{modify_site, right_frontier, site_depth};
use crate::head_rules::HeadRules;
use crate::node::{ParseNode, TOP_LABEL};
use crate::Err;

/// One input token, already tagged and optionally chunked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
  pub word: String,
  pub tag: String,
  /// `B-X`, `I-X` or `O`
  pub chunk: Option<String>,
}

impl TaggedToken {
  pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
    Self {
      word: word.into(),
      tag: tag.into(),
      chunk: None,
    }
  }

  pub fn chunked(word: impl Into<String>, tag: impl Into<String>, chunk: impl Into<String>) -> Self {
    Self {
      word: word.into(),
      tag: tag.into(),
      chunk: Some(chunk.into()),
    }
  }
}

/// Parses `word/TAG` or `word/TAG/CHUNK`. The word itself may contain `/`.
impl FromStr for TaggedToken {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let parts = s.rsplitn(3, '/').collect::<Vec<_>>();
    let token = match parts.as_slice() {
      [chunk, tag, word] if parse_chunk_tag(chunk).is_ok() => Some(Self::chunked(*word, *tag, *chunk)),
      [tag, _, ..] => Some(Self::new(&s[..s.len() - tag.len() - 1], *tag)),
      _ => None,
    };
    match token {
      Some(token) if !token.word.is_empty() && !token.tag.is_empty() => Ok(token),
      _ => Err(format!("expected word/TAG, got {:?}", s).into()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChunkTag {
  Begin(String),
  Inside(String),
  Outside,
}

fn parse_chunk_tag(s: &str) -> Result<ChunkTag, Err> {
  lazy_static! {
    static ref CHUNK_TAG: Regex = Regex::new(r"^(?:([BI])-(\S+)|O)$").unwrap();
  }

  let caps = CHUNK_TAG
    .captures(s)
    .ok_or_else(|| format!("bad chunk tag {:?}", s))?;
  match (caps.get(1), caps.get(2)) {
    (Some(bi), Some(label)) if bi.as_str() == "B" => Ok(ChunkTag::Begin(label.as_str().to_string())),
    (Some(_), Some(label)) => Ok(ChunkTag::Inside(label.as_str().to_string())),
    _ => Ok(ChunkTag::Outside),
  }
}

fn close_chunk(label: String, children: Vec<Rc<ParseNode>>, rules: &dyn HeadRules) -> ParseNode {
  let head = rules.head_of(&label, &children);
  let mut chunk = ParseNode::phrase(label, children, head);
  chunk.set_chunk(true);
  chunk
}

/// A snapshot of an in-progress parse.
///
/// Holds the punctuation-collapsed top-level nodes and the log probability
/// of every decision taken so far. Cloning is cheap: nodes are shared until
/// one of the clones changes them.
#[derive(Debug, Clone)]
pub struct Derivation {
  nodes: Vec<Rc<ParseNode>>,
  log_prob: f64,
  root: Option<Rc<ParseNode>>,
  /// Nothing but punctuation was given, so nothing was collapsed
  punctuation_only: bool,
}

impl Derivation {
  /// Starts a derivation over `nodes`. Punctuation tokens are moved into the
  /// punctuation sets of their neighbours, unless there is nothing else.
  pub fn new(nodes: Vec<ParseNode>, punctuation: &HashSet<String>) -> Self {
    let all_punct = !nodes.is_empty() && nodes.iter().all(|n| n.is_punctuation(punctuation));

    let mut collapsed: Vec<ParseNode> = Vec::with_capacity(nodes.len());
    let mut pending = Vec::new();
    for mut node in nodes {
      if !all_punct && node.is_punctuation(punctuation) {
        let punct = Rc::new(node);
        if let Some(last) = collapsed.last_mut() {
          last.push_next_punctuation(punct.clone());
        }
        pending.push(punct);
      } else {
        node.set_prev_punctuation(std::mem::take(&mut pending));
        collapsed.push(node);
      }
    }

    Self {
      nodes: collapsed.into_iter().map(Rc::new).collect(),
      log_prob: 0.0,
      root: None,
      punctuation_only: all_punct,
    }
  }

  /// Starts a derivation from tagged tokens, grouping chunk-tagged runs into
  /// basal chunk constituents. An `I-X` that doesn't continue an open `X`
  /// chunk starts a new one.
  pub fn from_tagged(
    tokens: &[TaggedToken],
    rules: &dyn HeadRules,
    punctuation: &HashSet<String>,
  ) -> Result<Self, Err> {
    let mut nodes = Vec::with_capacity(tokens.len());
    let mut open: Option<(String, Vec<Rc<ParseNode>>)> = None;

    for (idx, token) in tokens.iter().enumerate() {
      let leaf = ParseNode::token(token.word.as_str(), token.tag.as_str(), idx);
      let tag = match &token.chunk {
        Some(chunk) => parse_chunk_tag(chunk)?,
        None => ChunkTag::Outside,
      };

      let continues = matches!((&tag, &open), (ChunkTag::Inside(l), Some((o, _))) if l == o);
      if continues {
        if let Some((_, children)) = open.as_mut() {
          children.push(Rc::new(leaf));
        }
        continue;
      }

      if let Some((label, children)) = open.take() {
        nodes.push(close_chunk(label, children, rules));
      }
      match tag {
        ChunkTag::Begin(label) | ChunkTag::Inside(label) => open = Some((label, vec![Rc::new(leaf)])),
        ChunkTag::Outside => nodes.push(leaf),
      }
    }

    if let Some((label, children)) = open.take() {
      nodes.push(close_chunk(label, children, rules));
    }

    Ok(Self::new(nodes, punctuation))
  }

  /// Top-level nodes, punctuation collapsed
  pub fn nodes(&self) -> &[Rc<ParseNode>] {
    &self.nodes
  }

  pub fn log_prob(&self) -> f64 {
    self.log_prob
  }

  pub fn prob(&self) -> f64 {
    self.log_prob.exp()
  }

  /// The TOP node, once the derivation is complete
  pub fn root(&self) -> Option<&Rc<ParseNode>> {
    self.root.as_ref()
  }

  pub fn is_complete(&self) -> bool {
    self.root.is_some()
  }

  /// Index of the leftmost top-level node that is not yet built
  pub fn advance_index(&self) -> Option<usize> {
    self.nodes.iter().position(|n| !n.is_built())
  }

  /// Whether the next step should just put everything under TOP: there is
  /// nothing left to decide, only a single token is left, or the sentence
  /// is all punctuation.
  pub fn ready_for_top(&self) -> bool {
    self.punctuation_only
      || self.nodes.is_empty()
      || self.advance_index().is_none()
      || (self.nodes.len() == 1 && self.nodes[0].is_token())
  }

  /// Open attachment sites, deepest first, on the leftmost top-level node
  pub fn right_frontier(&self) -> Vec<Rc<ParseNode>> {
    self.nodes.first().map(right_frontier).unwrap_or_default()
  }

  pub(crate) fn add_log_prob(&mut self, log_prob: f64) {
    self.log_prob += log_prob;
  }

  /// Puts every top-level node, with its collapsed punctuation, under a TOP node
  pub(crate) fn promote(&mut self, rules: &dyn HeadRules) {
    let nodes = std::mem::take(&mut self.nodes);
    let last = nodes.len().saturating_sub(1);

    let mut children = Vec::new();
    for (idx, mut node) in nodes.into_iter().enumerate() {
      let (prev, next) = Rc::make_mut(&mut node).take_punctuation();
      children.extend(prev);
      children.push(node);
      // everything between two nodes is also the next node's prev punctuation
      if idx == last {
        children.extend(next);
      }
    }

    let root = if children.is_empty() {
      ParseNode::empty_top()
    } else {
      let head = rules.head_of(TOP_LABEL, &children);
      let mut top = ParseNode::phrase(TOP_LABEL, children, head);
      top.set_built(true);
      top
    };
    self.root = Some(Rc::new(root));
  }

  /// Wraps `nodes[index]` in a new unbuilt constituent labelled `label`
  pub(crate) fn build(&mut self, index: usize, label: &str, rules: &dyn HeadRules) {
    let mut child = self.nodes[index].clone();
    let (prev, next) = {
      let child = Rc::make_mut(&mut child);
      child.set_built(true);
      child.take_punctuation()
    };

    let children = vec![child];
    let head = rules.head_of(label, &children);
    let mut parent = ParseNode::phrase(label, children, head);
    parent.set_prev_punctuation(prev);
    parent.set_next_punctuation(next);
    self.nodes[index] = Rc::new(parent);
  }

  pub(crate) fn mark_built(&mut self, index: usize) {
    Rc::make_mut(&mut self.nodes[index]).set_built(true);
  }

  /// Takes `nodes[index]` off the top level, returning it and its punctuation
  fn detach(&mut self, index: usize) -> (Rc<ParseNode>, Vec<Rc<ParseNode>>, Vec<Rc<ParseNode>>) {
    assert_eq!(index, 1, "only the node after the leftmost can attach");
    let mut node = self.nodes.remove(index);
    let (prev, next) = Rc::make_mut(&mut node).take_punctuation();
    (node, prev, next)
  }

  /// Makes `nodes[index]` the last child of `frontier[site]`, where
  /// `frontier` has `frontier_len` sites
  pub(crate) fn attach_daughter(
    &mut self,
    index: usize,
    frontier_len: usize,
    site: usize,
    rules: &dyn HeadRules,
  ) {
    let (node, prev, next) = self.detach(index);
    modify_site(&mut self.nodes[0], site_depth(frontier_len, site), |parent| {
      let children = parent.children_mut();
      children.extend(prev);
      children.push(node);
      let head = rules.head_of(parent.label(), parent.children());
      parent.set_head(head);
      parent.refresh_span();
    });
    Rc::make_mut(&mut self.nodes[0]).set_next_punctuation(next);
  }

  /// Replaces `frontier[site]` with a new node of the same label holding it
  /// and `nodes[index]`
  pub(crate) fn attach_sister(
    &mut self,
    index: usize,
    frontier_len: usize,
    site: usize,
    rules: &dyn HeadRules,
  ) {
    let (node, prev, next) = self.detach(index);
    let depth = site_depth(frontier_len, site);

    if depth == 0 {
      let mut sibling = self.nodes.remove(0);
      let (sibling_prev, _) = Rc::make_mut(&mut sibling).take_punctuation();
      let mut adjoined = adjoin(sibling, prev, node, rules);
      adjoined.set_prev_punctuation(sibling_prev);
      adjoined.set_next_punctuation(next);
      self.nodes.insert(0, Rc::new(adjoined));
    } else {
      modify_site(&mut self.nodes[0], depth - 1, |parent| {
        let sibling = parent
          .children_mut()
          .pop()
          .expect("right frontier site missing");
        let adjoined = adjoin(sibling, prev, node, rules);
        parent.children_mut().push(Rc::new(adjoined));
        let head = rules.head_of(parent.label(), parent.children());
        parent.set_head(head);
        parent.refresh_span();
      });
      Rc::make_mut(&mut self.nodes[0]).set_next_punctuation(next);
    }
  }
}

/// A built node labelled like `sibling`, over `sibling`, `punct` and `node`
fn adjoin(
  sibling: Rc<ParseNode>,
  punct: Vec<Rc<ParseNode>>,
  node: Rc<ParseNode>,
  rules: &dyn HeadRules,
) -> ParseNode {
  let label = sibling.label().to_string();
  let mut children = vec![sibling];
  children.extend(punct);
  children.push(node);

  let head = rules.head_of(&label, &children);
  let mut adjoined = ParseNode::phrase(label, children, head);
  adjoined.set_built(true);
  adjoined
}

impl fmt::Display for Derivation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(root) = &self.root {
      return write!(f, "{:.4} {}", self.log_prob, root);
    }
    write!(f, "{:.4}", self.log_prob)?;
    for node in self.nodes.iter() {
      let marker = if node.is_built() { "*" } else { "" };
      write!(f, " {}{}[{}]", marker, node.label(), node.span())?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::head_rules::HeadTable;
  use crate::span::Span;

  fn punctuation() -> HashSet<String> {
    [".", ","].iter().map(|s| s.to_string()).collect()
  }

  fn tagged(s: &str) -> Vec<TaggedToken> {
    s.split_whitespace().map(|t| t.parse().unwrap()).collect()
  }

  fn derivation(s: &str) -> Derivation {
    Derivation::from_tagged(&tagged(s), &HeadTable::english(), &punctuation()).unwrap()
  }

  fn labels(nodes: &[Rc<ParseNode>]) -> Vec<&str> {
    nodes.iter().map(|n| n.label()).collect()
  }

  #[test]
  fn test_tagged_token_parsing() {
    assert_eq!("dog/NN".parse::<TaggedToken>().unwrap(), TaggedToken::new("dog", "NN"));
    assert_eq!(
      "dog/NN/I-NP".parse::<TaggedToken>().unwrap(),
      TaggedToken::chunked("dog", "NN", "I-NP")
    );
    assert_eq!("1/2/CD".parse::<TaggedToken>().unwrap(), TaggedToken::new("1/2", "CD"));
    assert!("dog".parse::<TaggedToken>().is_err());
    assert!("dog/".parse::<TaggedToken>().is_err());
    assert!("/NN".parse::<TaggedToken>().is_err());
    assert!("dog//B-NP".parse::<TaggedToken>().is_err());
    assert!("/NN/B-NP".parse::<TaggedToken>().is_err());
  }

  #[test]
  fn test_punctuation_collapsed() {
    let d = derivation("Yes/UH ,/, the/DT dog/NN barks/VBZ ./.");
    assert_eq!(labels(d.nodes()), vec!["UH", "DT", "NN", "VBZ"]);
    assert_eq!(labels(d.nodes()[0].next_punctuation()), vec![","]);
    assert_eq!(labels(d.nodes()[1].prev_punctuation()), vec![","]);
    assert_eq!(labels(d.nodes()[3].next_punctuation()), vec!["."]);
    assert!(Rc::ptr_eq(
      &d.nodes()[0].next_punctuation()[0],
      &d.nodes()[1].prev_punctuation()[0]
    ));
  }

  #[test]
  fn test_only_punctuation_is_kept() {
    let d = derivation("./. ./.");
    assert_eq!(d.nodes().len(), 2);
    assert!(d.ready_for_top());
    assert!(d.advance_index().is_some());
    assert!(!derivation("./. dogs/NNS").ready_for_top());
  }

  #[test]
  fn test_chunks() {
    let d = derivation("the/DT/B-NP big/JJ/I-NP dog/NN/I-NP barks/VBZ/B-VP at/IN/O cats/NNS/I-NP");
    assert_eq!(labels(d.nodes()), vec!["NP", "VP", "IN", "NP"]);
    let np = &d.nodes()[0];
    assert!(np.is_chunk());
    assert!(!np.is_built());
    assert_eq!(np.span(), Span::new(0, 3));
    assert_eq!(np.head_word(), "dog");
    assert_eq!(d.nodes()[3].span(), Span::new(5, 6));
    assert!(d.nodes()[2].is_token());
  }

  #[test]
  fn test_bad_chunk_tag() {
    let tokens = vec![TaggedToken::chunked("dog", "NN", "X-NP")];
    assert!(Derivation::from_tagged(&tokens, &HeadTable::english(), &punctuation()).is_err());
  }

  #[test]
  fn test_promote_restores_punctuation() {
    let mut d = derivation("Yes/UH ,/, dogs/NNS bark/VBP ./.");
    for idx in 0..d.nodes().len() {
      d.mark_built(idx);
    }
    assert!(d.ready_for_top());
    d.promote(&HeadTable::english());

    let root = d.root().unwrap();
    assert!(root.is_top());
    assert_eq!(labels(root.children()), vec!["UH", ",", "NNS", "VBP", "."]);
    assert_eq!(root.span(), Span::new(0, 5));
    assert!(root.spans_consistent());
    assert!(root.descendants().iter().all(|n| n.prev_punctuation().is_empty()));
  }

  #[test]
  fn test_promote_empty() {
    let mut d = derivation("");
    assert!(d.ready_for_top());
    d.promote(&HeadTable::english());
    let root = d.root().unwrap();
    assert!(root.children().is_empty());
    assert!(root.span().is_empty());
  }

  #[test]
  fn test_build_moves_punctuation_up() {
    let mut d = derivation("dogs/NNS bark/VBP ./.");
    d.build(1, "VP", &HeadTable::english());
    let vp = &d.nodes()[1];
    assert_eq!(vp.label(), "VP");
    assert!(!vp.is_built());
    assert!(vp.children()[0].is_built());
    assert!(vp.children()[0].next_punctuation().is_empty());
    assert_eq!(labels(vp.next_punctuation()), vec!["."]);
  }

  #[test]
  fn test_attach_daughter() {
    let rules = HeadTable::english();
    let mut d = derivation("the/DT/B-NP dog/NN/I-NP barks/VBZ ,/, loudly/RB");
    d.build(0, "S", &rules);
    d.mark_built(0);
    d.mark_built(1);
    let before = d.clone();

    let frontier = d.right_frontier();
    assert_eq!(labels(&frontier), vec!["NP", "S"]);
    d.attach_daughter(1, frontier.len(), 1, &rules);

    assert_eq!(d.nodes().len(), 2);
    let s = &d.nodes()[0];
    assert_eq!(labels(s.children()), vec!["NP", "VBZ"]);
    assert_eq!(s.span(), Span::new(0, 3));
    assert_eq!(labels(s.next_punctuation()), vec![","]);
    assert!(s.spans_consistent());

    // the clone taken before is untouched
    assert_eq!(before.nodes().len(), 3);
    assert_eq!(before.nodes()[0].span(), Span::new(0, 2));
    assert_eq!(labels(before.nodes()[0].children()), vec!["NP"]);
  }

  #[test]
  fn test_attach_sister_at_root() {
    let rules = HeadTable::english();
    let mut d = derivation("the/DT/B-NP dog/NN/I-NP ,/, a/DT/B-NP cat/NN/I-NP");
    d.mark_built(0);
    d.mark_built(1);

    let frontier = d.right_frontier();
    assert_eq!(labels(&frontier), vec!["NP"]);
    d.attach_sister(1, frontier.len(), 0, &rules);

    assert_eq!(d.nodes().len(), 1);
    let np = &d.nodes()[0];
    assert_eq!(np.label(), "NP");
    assert!(!np.is_chunk());
    assert!(np.is_built());
    assert_eq!(labels(np.children()), vec!["NP", ",", "NP"]);
    assert_eq!(np.span(), Span::new(0, 5));
    assert!(np.spans_consistent());
  }

  #[test]
  fn test_frontier_stops_at_attached_token() {
    let rules = HeadTable::english();
    let mut d = derivation("the/DT/B-NP dog/NN/I-NP barks/VBZ at/IN");
    d.build(0, "S", &rules);
    d.mark_built(0);
    d.mark_built(1);
    let frontier = d.right_frontier();
    d.attach_daughter(1, frontier.len(), 1, &rules);
    assert_eq!(labels(&d.right_frontier()), vec!["S"]);
  }

  #[test]
  fn test_attach_sister_below_root() {
    let rules = HeadTable::english();
    let mut d = derivation("the/DT/B-NP dog/NN/I-NP barks/VBZ");
    d.build(0, "S", &rules);
    d.mark_built(0);
    d.mark_built(1);
    let frontier = d.right_frontier();
    // sister of the NP inside S
    d.attach_sister(1, frontier.len(), 0, &rules);
    let s = &d.nodes()[0];
    assert_eq!(labels(s.children()), vec!["NP"]);
    let adjoined = &s.children()[0];
    assert_eq!(labels(adjoined.children()), vec!["NP", "VBZ"]);
    assert_eq!(s.span(), Span::new(0, 3));
    assert!(s.spans_consistent());
  }

  #[test]
  #[should_panic(expected = "only the node after the leftmost can attach")]
  fn test_attach_far_node_is_fatal() {
    let rules = HeadTable::english();
    let mut d = derivation("the/DT/B-NP dog/NN/I-NP barks/VBZ loudly/RB");
    d.mark_built(0);
    d.attach_daughter(2, 1, 0, &rules);
  }
}
