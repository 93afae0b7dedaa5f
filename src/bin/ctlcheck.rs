//! Thin CLI driver for a transition-system-and-formula input file:
//!
//! ```text
//! states N
//! init K s1 s2 … sK
//! transitions M
//! u1 v1
//! …
//! uM vM
//! labels J
//! state P p1 p2 … pP
//! …
//! <formula>
//! ```
//!
//! Prints `true`/`false` and exits 0/1 accordingly. This binary is a thin
//! external frontend over the `symctl` library, not part of its public API;
//! it is only built with `--features cli`.

use clap::Parser;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use symctl::{ModelChecker, TransitionSystem};

#[derive(Parser)]
#[command(name = "ctlcheck", about = "Symbolic CTL model checker")]
struct Cli {
    /// Path to a transition-system-and-formula input file.
    input: PathBuf,

    /// Dump the transition BDD as a .dot graph to this path before checking.
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let contents = match fs::read_to_string(&cli.input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let parsed = match parse_input(&contents) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let ts = match TransitionSystem::new(
        parsed.num_states,
        parsed.transitions,
        parsed.labeling,
        Some(parsed.init),
        None,
    ) {
        Ok(ts) => ts,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(dot_path) = &cli.dot {
        let dot = ts.bdd().as_dot_string(ts.transition(), true);
        if let Err(e) = fs::write(dot_path, dot) {
            eprintln!("error: could not write {}: {e}", dot_path.display());
            return ExitCode::FAILURE;
        }
    }

    let checker = ModelChecker::new(&ts);
    match checker.satisfies(parsed.formula.as_str()) {
        Ok(true) => {
            println!("true");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("false");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

struct ParsedInput {
    num_states: usize,
    init: HashSet<usize>,
    transitions: Vec<(usize, usize)>,
    labeling: HashMap<usize, HashSet<String>>,
    formula: String,
}

fn parse_input(contents: &str) -> Result<ParsedInput, String> {
    let mut lines = contents.lines();

    let states_line = next_nonblank(&mut lines).ok_or("missing 'states N' line")?;
    let num_states: usize = parse_prefixed(states_line, "states")?;

    let init_line = next_nonblank(&mut lines).ok_or("missing 'init K ...' line")?;
    let mut init_fields = init_line.split_whitespace();
    expect_keyword(&mut init_fields, "init")?;
    let init_count: usize = take_next(&mut init_fields, "init count")?
        .parse()
        .map_err(|_| "invalid init count".to_string())?;
    let init: HashSet<usize> = init_fields
        .by_ref()
        .take(init_count)
        .map(|s| s.parse::<usize>().map_err(|_| "invalid init state".to_string()))
        .collect::<Result<_, _>>()?;

    let transitions_line = next_nonblank(&mut lines).ok_or("missing 'transitions M' line")?;
    let num_transitions: usize = parse_prefixed(transitions_line, "transitions")?;
    let mut transitions = Vec::with_capacity(num_transitions);
    for _ in 0..num_transitions {
        let line = next_nonblank(&mut lines).ok_or("missing transition line")?;
        let mut fields = line.split_whitespace();
        let u: usize = take_next(&mut fields, "transition source")?
            .parse()
            .map_err(|_| "invalid transition source".to_string())?;
        let v: usize = take_next(&mut fields, "transition target")?
            .parse()
            .map_err(|_| "invalid transition target".to_string())?;
        transitions.push((u, v));
    }

    let labels_line = next_nonblank(&mut lines).ok_or("missing 'labels J' line")?;
    let num_labeled: usize = parse_prefixed(labels_line, "labels")?;
    let mut labeling = HashMap::new();
    for _ in 0..num_labeled {
        let line = next_nonblank(&mut lines).ok_or("missing label line")?;
        let mut fields = line.split_whitespace();
        let state: usize = take_next(&mut fields, "label state")?
            .parse()
            .map_err(|_| "invalid label state".to_string())?;
        let prop_count: usize = take_next(&mut fields, "label prop count")?
            .parse()
            .map_err(|_| "invalid label prop count".to_string())?;
        let props: HashSet<String> = fields.by_ref().take(prop_count).map(str::to_string).collect();
        labeling.insert(state, props);
    }

    let formula = next_nonblank(&mut lines).ok_or("missing formula line")?.to_string();

    Ok(ParsedInput { num_states, init, transitions, labeling, formula })
}

fn next_nonblank<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<&'a str> {
    lines.map(str::trim).find(|l| !l.is_empty())
}

fn parse_prefixed(line: &str, keyword: &str) -> Result<usize, String> {
    let mut fields = line.split_whitespace();
    expect_keyword(&mut fields, keyword)?;
    take_next(&mut fields, keyword)?.parse().map_err(|_| format!("invalid {keyword} value"))
}

fn expect_keyword<'a>(fields: &mut impl Iterator<Item = &'a str>, keyword: &str) -> Result<(), String> {
    match fields.next() {
        Some(tok) if tok == keyword => Ok(()),
        Some(tok) => Err(format!("expected '{keyword}', found '{tok}'")),
        None => Err(format!("expected '{keyword}', found end of line")),
    }
}

fn take_next<'a>(fields: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<&'a str, String> {
    fields.next().ok_or_else(|| format!("missing {what}"))
}
