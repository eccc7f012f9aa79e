use std::rc::Rc;

use crate::node::ParseNode;

/// The right frontier of the tree rooted at `root`: every constituent on its
/// rightmost edge above token level, deepest first. `root` itself is last.
/// A bare token has an empty frontier.
pub fn right_frontier(root: &Rc<ParseNode>) -> Vec<Rc<ParseNode>> {
  let mut frontier = Vec::new();
  let mut node = root;
  while !node.is_token() {
    frontier.push(node.clone());
    match node.children().last() {
      Some(last) => node = last,
      None => break,
    }
  }
  frontier.reverse();
  frontier
}

/// Depth below the root of `frontier[site]`, for a frontier of length `len`
pub fn site_depth(len: usize, site: usize) -> usize {
  assert!(site < len, "frontier site {} out of {}", site, len);
  len - 1 - site
}

/// Runs `f` on the node `depth` steps down the rightmost edge of `root`,
/// copying every node on the way that is shared with another tree, then
/// recomputes the spans of the nodes above it.
///
/// Panics if the edge ends before `depth`: asking for a site that isn't on
/// the frontier is a logic error.
pub(crate) fn modify_site<F>(root: &mut Rc<ParseNode>, depth: usize, f: F)
where
  F: FnOnce(&mut ParseNode),
{
  let node = Rc::make_mut(root);
  if depth == 0 {
    f(node);
  } else {
    let child = node
      .children_mut()
      .last_mut()
      .unwrap_or_else(|| panic!("right frontier site missing {} levels down", depth));
    assert!(
      !child.is_token(),
      "right frontier site missing {} levels down",
      depth
    );
    modify_site(child, depth - 1, f);
  }
  node.refresh_span();
}
