//! Beam search for XOR-difference codes.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use magpie::report;
use magpie_beam::{BeamParams, Problem, beam_search};
use magpie_problems::{ALPHABET, GreaseCodes};

/// Search for codes over 10-bit words maximising the number of
/// distinct pairwise XOR differences.
#[derive(Debug, Parser)]
struct Args {
    /// Target code length.
    length: usize,
    /// Beam width (survivor table capacity per generation).
    #[arg(long, default_value_t = 10_000)]
    beam: usize,
    /// Probe attempts per insertion.
    #[arg(long, default_value_t = 3)]
    probes: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let problem = GreaseCodes::new(args.length)?;
    let params = BeamParams {
        beam_size: args.beam,
        generations: problem.generations(),
        probes: args.probes,
    };
    info!(
        length = args.length,
        beam = args.beam,
        probes = args.probes,
        "starting grease-code search"
    );

    let outcome = beam_search(&problem, &[problem.seed()], &params);
    report::print_summary(
        &outcome.survivors,
        |code| problem.fitness(code),
        ALPHABET as u32,
    );
    Ok(())
}
