//! k-best beam search over flat label sequences.
//!
//! At every input position each surviving hypothesis is extended by the
//! `size` most probable outcomes its classifier proposes, and only the
//! `size` best extensions survive to the next position. The same bounded
//! heap also drives the tree parser's beam over derivations.

pub mod config;
pub mod heap;
pub mod search;
pub mod sequence;

pub use config::BeamConfig;
pub use heap::BoundedHeap;
pub use search::{AcceptAll, BeamSearch, SequenceContextGenerator, SequenceValidator};
pub use sequence::ScoredSequence;
