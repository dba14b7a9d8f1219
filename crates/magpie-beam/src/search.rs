//! Generation driver: advance the beam until the generation budget is
//! spent, a perfect record appears, or the beam dies out.

use tracing::info;

use crate::problem::Problem;
use crate::table::BeamTable;

/// Knobs of a beam run.
#[derive(Debug, Clone)]
pub struct BeamParams {
    /// Table capacity per generation — the cap on simultaneously
    /// tracked candidates. Clamped up to
    /// [`MIN_CAPACITY`](crate::table::MIN_CAPACITY).
    pub beam_size: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Probe attempts per insertion. A small budget makes the beam
    /// "more random": low-fitness records get more chances to survive
    /// transient collisions.
    pub probes: usize,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct BeamOutcome<S> {
    /// The final beam, compacted. A set: no ordering is guaranteed.
    pub survivors: Vec<S>,
    /// Whether a perfect record was probed in.
    pub perfect_found: bool,
    /// Generations actually expanded (less than requested when the
    /// search stopped early).
    pub generations_run: usize,
}

/// Run the beam search.
///
/// Seeds the first table, then per generation: allocate a fresh table,
/// expand every surviving parent in parallel, swap. All child
/// insertions of a generation complete before the next begins. A
/// generation whose offspring included a perfect record is the last one
/// expanded; the current generation always runs to completion first, so
/// every child produced is observed by its table.
pub fn beam_search<P: Problem>(
    problem: &P,
    seeds: &[P::State],
    params: &BeamParams,
) -> BeamOutcome<P::State> {
    let mut current = BeamTable::new(problem, params.beam_size, params.probes);
    for seed in seeds {
        current.probe(seed.clone());
    }

    let mut perfect_found = false;
    let mut generations_run = 0;
    for generation in 0..params.generations {
        info!(
            generation,
            parents = current.occupied(),
            "expanding generation"
        );
        let next = BeamTable::new(problem, params.beam_size, params.probes);
        current.par_expand(&next);
        if next.occupied() == 0 {
            info!(generation, "beam died out, keeping previous generation");
            break;
        }
        perfect_found = next.perfect_found();
        current = next;
        generations_run = generation + 1;
        if perfect_found {
            info!(generation, "perfect record reached, stopping early");
            break;
        }
    }

    BeamOutcome {
        survivors: current.into_survivors(),
        perfect_found,
        generations_run,
    }
}
