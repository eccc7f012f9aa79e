#[macro_use]
extern crate lazy_static;

pub mod beam;
pub mod context;
pub mod derivation;
pub mod frontier;
pub mod head_rules;
pub mod model;
pub mod node;
pub mod outcome;
pub mod parser;
pub mod span;
pub mod syntree;
pub mod utils;

pub use crate::beam::{BeamConfig, BeamSearch, ScoredSequence};
pub use crate::context::DefaultContext;
pub use crate::derivation::{Derivation, TaggedToken};
pub use crate::head_rules::{HeadRules, HeadTable};
pub use crate::model::{Classifier, LookupModel};
pub use crate::node::ParseNode;
pub use crate::parser::{Parse, Parser, ParserConfig};
pub use crate::span::Span;
pub use crate::syntree::SynTree;
pub use crate::utils::Err;

#[test]
fn test_tagged_sentence_to_tree() {
  use crate::outcome::{ATTACH_DAUGHTER, ATTACH_SISTER, DONE, NON_ATTACH};

  let build = LookupModel::new([DONE, "NP", "S"])
    .with_default(&[(DONE, 1.0)])
    .unwrap()
    .with_rule(&["t0=NP", "t-1=*BOS*"], &[("S", 1.0)])
    .unwrap();
  let attach = LookupModel::new([ATTACH_SISTER, ATTACH_DAUGHTER, NON_ATTACH])
    .with_default(&[(ATTACH_DAUGHTER, 1.0)])
    .unwrap();
  let parser = Parser::new(build, attach).unwrap();

  let tokens = "the/DT/B-NP dog/NN/I-NP barks/VBZ ./."
    .split_whitespace()
    .map(|t| t.parse::<TaggedToken>())
    .collect::<Result<Vec<_>, _>>()
    .unwrap();
  let parse = parser.parse_best(&tokens).unwrap().unwrap();

  assert_eq!(parse.log_prob(), 0.0);
  assert_eq!(
    parse.to_string(),
    "(0..4: TOP\n  (0..3: S\n    (0..2: NP\n      (0..1: DT (0..1: the))\n      (1..2: NN (1..2: dog)))\n    (2..3: VBZ (2..3: barks)))\n  (3..4: . (3..4: .)))"
  );
}
