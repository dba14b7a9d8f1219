//! Beam search for 4×4 GF(2) tensor-line packings.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use magpie::report;
use magpie_beam::{BeamParams, Problem, beam_search};
use magpie_problems::LinePacking;

/// Generators of the 8-dimensional target sum space, as 16-bit tensor
/// vectors in hex.
const SUM_TARGETS: [u64; 4] = [0x0041, 0x0082, 0x4100, 0x8200];

/// Lines to pack: six generations of growth over the fixed target.
const GENERATIONS: usize = 6;

/// Search for packings of 4×4 tensor lines meeting the fixed GF(2)
/// target space.
#[derive(Debug, Parser)]
struct Args {
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

    let problem = LinePacking::gf2();
    let seed = problem.seed(&SUM_TARGETS, &[]);
    let params = BeamParams {
        beam_size: args.beam,
        generations: GENERATIONS,
        probes: args.probes,
    };
    info!(beam = args.beam, probes = args.probes, "starting gf2 line packing");

    let outcome = beam_search(&problem, &[seed], &params);
    report::print_summary(
        &outcome.survivors,
        |packing| problem.fitness(packing),
        SUM_TARGETS.len() as u32,
    );
    Ok(())
}
