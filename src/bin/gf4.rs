//! Beam search for 8×8 tensor-line packings (the GF(4) experiment).

use anyhow::Result;
use clap::Parser;
use tracing::info;

use magpie::report;
use magpie_beam::{BeamParams, Problem, beam_search};
use magpie_problems::LinePacking;

/// Generators of the 8-dimensional target sum space, as 64-bit tensor
/// vectors in hex.
const SUM_TARGETS: [u64; 8] = [
    0x2010_0201,
    0x3020_0302,
    0x8040_0804,
    0xC080_0C08,
    0x2010_0201_0000_0000,
    0x3020_0302_0000_0000,
    0x8040_0804_0000_0000,
    0xC080_0C08_0000_0000,
];

/// Extra generators of the widened 12-dimensional target: the even
/// projections of the sum targets.
const WIDE_TARGETS: [u64; 4] = [
    0x2000_0200,
    0x8000_0800,
    0x2000_0200_0000_0000,
    0x8000_0800_0000_0000,
];

/// Lines to pack: the packing can grow to 21 lines.
const GENERATIONS: usize = 21;

/// Search for packings of 8×8 tensor lines meeting the fixed target
/// spaces.
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

    let problem = LinePacking::gf4();
    let seed = problem.seed(&SUM_TARGETS, &WIDE_TARGETS);
    let params = BeamParams {
        beam_size: args.beam,
        generations: GENERATIONS,
        probes: args.probes,
    };
    info!(beam = args.beam, probes = args.probes, "starting gf4 line packing");

    let outcome = beam_search(&problem, &[seed], &params);
    report::print_summary(
        &outcome.survivors,
        |packing| problem.fitness(packing),
        SUM_TARGETS.len() as u32,
    );
    Ok(())
}
