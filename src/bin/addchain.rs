//! Beam search for modular addition chains.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use magpie::report;
use magpie_beam::{BeamParams, Problem, beam_search};
use magpie_problems::AdditionChains;

/// Search for addition chains over Z/p whose difference closure covers
/// every residue.
#[derive(Debug, Parser)]
struct Args {
    /// Modulus of the residue ring.
    modulus: u16,
    /// Target chain length.
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

    let problem = AdditionChains::new(args.modulus, args.length)?;
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
        "starting addition-chain search"
    );

    let outcome = beam_search(&problem, &[problem.seed()], &params);
    report::print_summary(
        &outcome.survivors,
        |chain| problem.fitness(chain),
        u32::from(args.modulus),
    );
    Ok(())
}
