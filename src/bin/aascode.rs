//! Beam search for AAS-coverage codes.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use magpie::report;
use magpie_beam::{BeamParams, Problem, beam_search};
use magpie_problems::AasCodes;

/// Search for codes over Z/p whose almost-arithmetic-sequence closure
/// covers every residue.
#[derive(Debug, Parser)]
struct Args {
    /// Modulus of the residue ring.
    modulus: u16,
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

    let problem = AasCodes::new(args.modulus, args.length)?;
    let params = BeamParams {
        beam_size: args.beam,
        generations: problem.generations(),
        probes: args.probes,
    };
    info!(
        modulus = args.modulus,
        length = args.length,
        beam = args.beam,
        probes = args.probes,
        "starting aas-code search"
    );

    let outcome = beam_search(&problem, &[problem.seed()], &params);
    report::print_summary(
        &outcome.survivors,
        |code| problem.fitness(code),
        u32::from(args.modulus),
    );
    Ok(())
}
