use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::span::Span;
use crate::syntree::SynTree;

/// Label of the root node of every complete parse
pub const TOP_LABEL: &str = "TOP";

/// A constituent or a token in a (partial) parse tree.
///
/// Nodes are shared between derivations through `Rc`, and are only ever
/// mutated through `Rc::make_mut`, so a change in one derivation copies the
/// nodes on the changed path and leaves every other derivation untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseNode {
  label: String,
  span: Span,
  /// Word text, only for tokens
  word: Option<String>,
  children: Vec<Rc<ParseNode>>,
  /// Index into `children`
  head: Option<usize>,
  built: bool,
  chunk: bool,
  prev_punct: Vec<Rc<ParseNode>>,
  next_punct: Vec<Rc<ParseNode>>,
}

impl ParseNode {
  /// A token at position `index`, labelled with its part of speech tag
  pub fn token(word: impl Into<String>, tag: impl Into<String>, index: usize) -> Self {
    Self {
      label: tag.into(),
      span: Span::token(index),
      word: Some(word.into()),
      children: Vec::new(),
      head: None,
      built: false,
      chunk: false,
      prev_punct: Vec::new(),
      next_punct: Vec::new(),
    }
  }

  /// A constituent over `children`, which must not be empty.
  pub fn phrase(label: impl Into<String>, children: Vec<Rc<ParseNode>>, head: usize) -> Self {
    let span = Span::covering(children.iter().map(|c| c.span))
      .expect("phrase needs at least one child");
    assert!(head < children.len(), "head {} out of range", head);
    Self {
      label: label.into(),
      span,
      word: None,
      children,
      head: Some(head),
      built: false,
      chunk: false,
      prev_punct: Vec::new(),
      next_punct: Vec::new(),
    }
  }

  /// The root of an empty sentence
  pub(crate) fn empty_top() -> Self {
    Self {
      label: TOP_LABEL.to_string(),
      span: Span::new(0, 0),
      word: None,
      children: Vec::new(),
      head: None,
      built: true,
      chunk: false,
      prev_punct: Vec::new(),
      next_punct: Vec::new(),
    }
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn span(&self) -> Span {
    self.span
  }

  pub fn word(&self) -> Option<&str> {
    self.word.as_deref()
  }

  pub fn children(&self) -> &[Rc<ParseNode>] {
    &self.children
  }

  pub fn is_token(&self) -> bool {
    self.word.is_some()
  }

  pub fn is_top(&self) -> bool {
    self.label == TOP_LABEL && !self.is_token()
  }

  /// Whether no further parent may be built directly above this node
  pub fn is_built(&self) -> bool {
    self.built
  }

  /// Whether this is a pre-chunked basal constituent
  pub fn is_chunk(&self) -> bool {
    self.chunk
  }

  pub fn is_punctuation(&self, punctuation: &HashSet<String>) -> bool {
    self.is_token() && punctuation.contains(&self.label)
  }

  pub fn head_index(&self) -> Option<usize> {
    self.head
  }

  /// The head child, None for tokens
  pub fn head(&self) -> Option<&Rc<ParseNode>> {
    self.head.map(|idx| &self.children[idx])
  }

  /// Follows head children down to a token. Tokens are their own head.
  pub fn head_token(&self) -> &ParseNode {
    match self.head() {
      Some(child) => child.head_token(),
      None => self,
    }
  }

  /// Word of the head token
  pub fn head_word(&self) -> &str {
    self.head_token().word().unwrap_or("")
  }

  /// Punctuation collapsed out of the sibling sequence just before this node
  pub fn prev_punctuation(&self) -> &[Rc<ParseNode>] {
    &self.prev_punct
  }

  /// Punctuation collapsed out of the sibling sequence just after this node
  pub fn next_punctuation(&self) -> &[Rc<ParseNode>] {
    &self.next_punct
  }

  /// Every token under this node, in order
  pub fn tokens(&self) -> Vec<&ParseNode> {
    let mut out = Vec::new();
    self.collect_tokens(&mut out);
    out
  }

  fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a ParseNode>) {
    if self.is_token() {
      out.push(self);
    } else {
      for child in self.children.iter() {
        child.collect_tokens(out);
      }
    }
  }

  /// Every node in this subtree, parents before children
  pub fn descendants(&self) -> Vec<&ParseNode> {
    let mut out = vec![self];
    let mut idx = 0;
    while idx < out.len() {
      let node = out[idx];
      out.extend(node.children.iter().map(|c| c.as_ref()));
      idx += 1;
    }
    out
  }

  /// Whether every constituent in this subtree spans exactly its tokens,
  /// and those tokens are contiguous
  pub fn spans_consistent(&self) -> bool {
    self.descendants().iter().filter(|n| !n.is_token()).all(|n| {
      let tokens = n.tokens();
      let contiguous = tokens
        .windows(2)
        .all(|w| w[0].span().end() == w[1].span().start());
      match Span::covering(tokens.iter().map(|t| t.span())) {
        Some(span) => contiguous && span == n.span(),
        None => n.span().is_empty(),
      }
    })
  }

  pub fn to_syntree(&self) -> SynTree<String, String> {
    SynTree::from(self)
  }

  pub(crate) fn set_built(&mut self, built: bool) {
    self.built = built;
  }

  pub(crate) fn set_chunk(&mut self, chunk: bool) {
    self.chunk = chunk;
  }

  pub(crate) fn set_head(&mut self, head: usize) {
    assert!(head < self.children.len(), "head {} out of range", head);
    self.head = Some(head);
  }

  pub(crate) fn children_mut(&mut self) -> &mut Vec<Rc<ParseNode>> {
    &mut self.children
  }

  pub(crate) fn set_prev_punctuation(&mut self, punct: Vec<Rc<ParseNode>>) {
    self.prev_punct = punct;
  }

  pub(crate) fn set_next_punctuation(&mut self, punct: Vec<Rc<ParseNode>>) {
    self.next_punct = punct;
  }

  pub(crate) fn push_next_punctuation(&mut self, punct: Rc<ParseNode>) {
    self.next_punct.push(punct);
  }

  /// Removes both punctuation sets, returning (prev, next)
  pub(crate) fn take_punctuation(&mut self) -> (Vec<Rc<ParseNode>>, Vec<Rc<ParseNode>>) {
    (
      std::mem::take(&mut self.prev_punct),
      std::mem::take(&mut self.next_punct),
    )
  }

  /// Recomputes the span from the children. No-op on tokens.
  pub(crate) fn refresh_span(&mut self) {
    if let Some(span) = Span::covering(self.children.iter().map(|c| c.span)) {
      self.span = span;
    }
  }
}

impl fmt::Display for ParseNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.to_syntree())
  }
}
