use criterion::{black_box, criterion_group, criterion_main, Criterion};

use beamtree::outcome::{ATTACH_DAUGHTER, ATTACH_SISTER, DONE, NON_ATTACH};
use beamtree::{BeamConfig, BeamSearch, LookupModel, Parser, TaggedToken};

fn parser() -> Parser {
  let build = LookupModel::new([DONE, "NP", "VP", "PP", "S"])
    .with_default(&[(DONE, 1.0)])
    .unwrap()
    .with_rule(&["t0=DT"], &[("NP", 0.9), (DONE, 0.1)])
    .unwrap()
    .with_rule(&["t0=IN"], &[("PP", 0.9), (DONE, 0.1)])
    .unwrap()
    .with_rule(&["t0=VBZ"], &[("VP", 0.9), (DONE, 0.1)])
    .unwrap()
    .with_rule(&["t0=NP", "t-1=*BOS*"], &[("S", 0.6), (DONE, 0.4)])
    .unwrap();
  let attach = LookupModel::new([ATTACH_SISTER, ATTACH_DAUGHTER, NON_ATTACH])
    .with_default(&[(ATTACH_DAUGHTER, 0.5), (ATTACH_SISTER, 0.3), (NON_ATTACH, 0.2)])
    .unwrap();
  Parser::new(build, attach).unwrap()
}

fn tagged(s: &str) -> Vec<TaggedToken> {
  s.split_whitespace().map(|t| t.parse().unwrap()).collect()
}

fn criterion_benchmark(c: &mut Criterion) {
  let parser = parser();
  let simple_input = tagged("the/DT dog/NN barks/VBZ ./.");
  let complex_input = tagged("the/DT dog/NN barks/VBZ at/IN the/DT cat/NN in/IN the/DT garden/NN ./.");

  c.bench_function("parse simple", |b| {
    b.iter(|| parser.parse(black_box(&simple_input), 1).unwrap().len())
  });

  c.bench_function("parse with prepositions", |b| {
    b.iter(|| parser.parse(black_box(&complex_input), 5).unwrap().len())
  });

  let tagger = LookupModel::new(["DT", "NN", "VBZ", "IN"]);
  let search = BeamSearch::new(
    BeamConfig::with_size(5),
    |index: usize, input: &[&str], history: &[String], _: &[String]| -> Vec<String> {
      let prev = index.checked_sub(1).map_or("*BOS*", |i| history[i].as_str());
      vec![format!("w={}", input[index]), format!("prev={}", prev)]
    },
    tagger,
  );
  let words = "the dog barks at the cat in the garden"
    .split(' ')
    .collect::<Vec<_>>();

  c.bench_function("tag sequence", |b| {
    b.iter(|| search.best_sequences(3, black_box(&words), &[]).len())
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
