//! Feature context contracts for the build and attach decisions, and a
//! small default template.

use std::rc::Rc;

use crate::node::ParseNode;

/// Sentinel label for positions before the first top-level node
pub const BOS: &str = "*BOS*";
/// Sentinel label for positions after the last top-level node
pub const EOS: &str = "*EOS*";

/// Features for deciding what to build over `nodes[index]`.
/// `nodes` is the punctuation-collapsed top-level sequence of a derivation.
pub trait BuildContextGenerator {
  fn build_context(&self, nodes: &[Rc<ParseNode>], index: usize) -> Vec<String>;
}

/// Features for deciding how `nodes[index]` attaches to `frontier[site]`.
/// `frontier` is deepest first, so `frontier[..site]` are the sites already
/// passed over in this step.
pub trait AttachContextGenerator {
  fn attach_context(
    &self,
    nodes: &[Rc<ParseNode>],
    index: usize,
    frontier: &[Rc<ParseNode>],
    site: usize,
  ) -> Vec<String>;
}

impl<G: BuildContextGenerator + ?Sized> BuildContextGenerator for Box<G> {
  fn build_context(&self, nodes: &[Rc<ParseNode>], index: usize) -> Vec<String> {
    (**self).build_context(nodes, index)
  }
}

impl<G: AttachContextGenerator + ?Sized> AttachContextGenerator for Box<G> {
  fn attach_context(
    &self,
    nodes: &[Rc<ParseNode>],
    index: usize,
    frontier: &[Rc<ParseNode>],
    site: usize,
  ) -> Vec<String> {
    (**self).attach_context(nodes, index, frontier, site)
  }
}

/// Label/head-word features over a window of one node either side.
///
/// Build features for the node at offset `k` from the target are `t{k}=`
/// (label), `w{k}=` (head word) and `c{k}=` (label|head word), plus joint
/// label bigrams. Attach features describe the advancing node (`a*`), the
/// frontier site (`f*`), their combination, the depth of the site and the
/// labels already passed over.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContext;

fn label_at(nodes: &[Rc<ParseNode>], idx: isize) -> &str {
  if idx < 0 {
    BOS
  } else {
    nodes.get(idx as usize).map_or(EOS, |n| n.label())
  }
}

fn word_at(nodes: &[Rc<ParseNode>], idx: isize) -> &str {
  if idx < 0 {
    BOS
  } else {
    nodes.get(idx as usize).map_or(EOS, |n| n.head_word())
  }
}

impl BuildContextGenerator for DefaultContext {
  fn build_context(&self, nodes: &[Rc<ParseNode>], index: usize) -> Vec<String> {
    let index = index as isize;
    let mut features = vec!["default".to_string()];

    for k in -1..=1isize {
      let label = label_at(nodes, index + k);
      let word = word_at(nodes, index + k);
      features.push(format!("t{}={}", k, label));
      features.push(format!("w{}={}", k, word));
      features.push(format!("c{}={}|{}", k, label, word));
    }

    features.push(format!(
      "t-1,t0={},{}",
      label_at(nodes, index - 1),
      label_at(nodes, index)
    ));
    features.push(format!(
      "t0,t1={},{}",
      label_at(nodes, index),
      label_at(nodes, index + 1)
    ));

    let target = &nodes[index as usize];
    if target.is_token() {
      features.push("token".to_string());
    }
    if target.is_chunk() {
      features.push("chunk".to_string());
    }
    if !target.next_punctuation().is_empty() {
      let punct = target
        .next_punctuation()
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(",");
      features.push(format!("p1={}", punct));
    }

    features
  }
}

impl AttachContextGenerator for DefaultContext {
  fn attach_context(
    &self,
    nodes: &[Rc<ParseNode>],
    index: usize,
    frontier: &[Rc<ParseNode>],
    site: usize,
  ) -> Vec<String> {
    let node = &nodes[index];
    let fnode = &frontier[site];
    let mut features = vec!["default".to_string()];

    features.push(format!("a={}", node.label()));
    features.push(format!("aw={}", node.head_word()));
    features.push(format!("f={}", fnode.label()));
    features.push(format!("fw={}", fnode.head_word()));
    features.push(format!("f,a={},{}", fnode.label(), node.label()));
    features.push(format!("fw,aw={},{}", fnode.head_word(), node.head_word()));
    features.push(format!("depth={}", frontier.len() - 1 - site));

    if let Some(last) = fnode.children().last() {
      features.push(format!("fl,a={},{}", last.label(), node.label()));
    }

    let passed = frontier[..site]
      .iter()
      .map(|n| n.label())
      .collect::<Vec<_>>();
    features.push(format!("passed={}", passed.join(",")));

    let next = label_at(nodes, index as isize + 1);
    features.push(format!("f,a,a1={},{},{}", fnode.label(), node.label(), next));

    if !node.prev_punctuation().is_empty() {
      let punct = node
        .prev_punctuation()
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(",");
      features.push(format!("p-1={}", punct));
      features.push(format!("f,p-1={},{}", fnode.label(), punct));
    }

    features
  }
}
