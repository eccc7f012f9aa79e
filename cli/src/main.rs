use std::env;
use std::fs;
use std::io;
use std::io::Write;
use std::process;

use beamtree::outcome::{ATTACH_DAUGHTER, ATTACH_SISTER, DONE, NON_ATTACH};
use beamtree::{Err, HeadTable, LookupModel, Parser, ParserConfig, TaggedToken};
use tracing_subscriber::EnvFilter;

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} [options]

Reads one sentence per line as space-separated word/TAG or word/TAG/CHUNK
tokens, e.g. `the/DT/B-NP dog/NN/I-NP barks/VBZ ./.`, and prints its parses.
Set RUST_LOG=beamtree=debug to watch the beam.

Options:
  -h, --help          Print this message
  -n, --parses N      Print up to N parses (defaults to 1)
  -b, --beam N        Keep N derivations between steps (defaults to 20)
  -r, --rules FILE    Read head rules from FILE (defaults to the English table)",
    prog_name
  )
}

/// A tiny hand-written model: NPs over determiners, nouns and pronouns,
/// VPs over verbs, PPs over prepositions, an S over a sentence-initial NP,
/// and a preference for attaching as a daughter.
fn demo_parser(rules: HeadTable, config: ParserConfig) -> Result<Parser, Err> {
  let build = LookupModel::new([DONE, "NP", "VP", "PP", "S"])
    .with_default(&[(DONE, 1.0)])?
    .with_rule(&["t0=DT"], &[("NP", 0.9), (DONE, 0.1)])?
    .with_rule(&["t0=PRP"], &[("NP", 0.9), (DONE, 0.1)])?
    .with_rule(&["t0=NNP"], &[("NP", 0.8), (DONE, 0.2)])?
    .with_rule(&["t0=NNS", "t-1=*BOS*"], &[("NP", 0.8), (DONE, 0.2)])?
    .with_rule(&["t0=IN"], &[("PP", 0.9), (DONE, 0.1)])?
    .with_rule(&["t0=VBZ"], &[("VP", 0.9), (DONE, 0.1)])?
    .with_rule(&["t0=VBD"], &[("VP", 0.9), (DONE, 0.1)])?
    .with_rule(&["t0=VBP"], &[("VP", 0.9), (DONE, 0.1)])?
    .with_rule(&["t0=NP", "t-1=*BOS*"], &[("S", 0.6), (DONE, 0.4)])?;

  let attach = LookupModel::new([ATTACH_SISTER, ATTACH_DAUGHTER, NON_ATTACH])
    .with_default(&[(ATTACH_DAUGHTER, 0.4), (ATTACH_SISTER, 0.2), (NON_ATTACH, 0.4)])?
    .with_rule(&["f=NP", "a=NN"], &[(ATTACH_DAUGHTER, 0.9), (NON_ATTACH, 0.1)])?
    .with_rule(&["f=NP", "a=NNS"], &[(ATTACH_DAUGHTER, 0.9), (NON_ATTACH, 0.1)])?
    .with_rule(&["f=NP", "a=JJ"], &[(ATTACH_DAUGHTER, 0.9), (NON_ATTACH, 0.1)])?
    .with_rule(&["f=S", "a=VP"], &[(ATTACH_DAUGHTER, 0.9), (NON_ATTACH, 0.1)])?
    .with_rule(&["f=VP", "a=NP"], &[(ATTACH_DAUGHTER, 0.8), (NON_ATTACH, 0.2)])?
    .with_rule(&["f=VP", "a=PP"], &[(ATTACH_DAUGHTER, 0.6), (NON_ATTACH, 0.4)])?
    .with_rule(&["f=PP", "a=NP"], &[(ATTACH_DAUGHTER, 0.9), (NON_ATTACH, 0.1)])?
    .with_rule(&["f=NP", "a=PP"], &[(ATTACH_SISTER, 0.5), (NON_ATTACH, 0.5)])?;

  Ok(Parser::new(build, attach)?.with_head_rules(rules).with_config(config))
}

fn parse(parser: &Parser, sentence: &str, n: usize) -> Result<(), Err> {
  let tokens = sentence
    .split_whitespace()
    .map(|t| t.parse::<TaggedToken>())
    .collect::<Result<Vec<_>, _>>()?;

  let parses = parser.parse(&tokens, n)?;

  println!(
    "Parsed {} tree{}",
    parses.len(),
    if parses.len() == 1 { "" } else { "s" }
  );

  for p in parses {
    println!("log prob {:.4}", p.log_prob());
    println!("{}", p);
    println!();
  }

  Ok(())
}

struct Args {
  parses: usize,
  beam: usize,
  rules: Option<String>,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "beamtree"));
    }

    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap();

    let mut parses = 1;
    let mut beam = ParserConfig::default().beam_size;
    let mut rules: Option<String> = None;

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-n" || o == "--parses" || o == "-b" || o == "--beam" {
        let value = iter
          .next()
          .and_then(|v| v.parse::<usize>().ok())
          .filter(|v| *v > 0)
          .ok_or_else(|| Self::make_error_message(&format!("{} needs a positive number", o), &prog_name))?;
        if o == "-n" || o == "--parses" {
          parses = value;
        } else {
          beam = value;
        }
      } else if (o == "-r" || o == "--rules") && rules.is_none() {
        rules = Some(
          iter
            .next()
            .ok_or_else(|| Self::make_error_message("missing rules file", &prog_name))?,
        );
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    Ok(Self {
      parses,
      beam,
      rules,
    })
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let rules = match &opts.rules {
    Some(filename) => fs::read_to_string(filename)?.parse::<HeadTable>()?,
    None => HeadTable::english(),
  };
  let parser = demo_parser(rules, ParserConfig::with_beam_size(opts.beam))?;

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    match io::stdin().read_line(&mut input) {
      Ok(_) => {
        if input.is_empty() {
          // ctrl+d
          return Ok(());
        }
        if let Err(e) = parse(&parser, input.trim(), opts.parses) {
          eprintln!("error: {}", e);
        }
        input.clear();
      }
      Err(error) => return Err(error.into()),
    }
  }
}
