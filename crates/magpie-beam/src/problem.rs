//! The domain adapter contract.

use std::hash::Hash;

use crate::fitness::Fitness;

/// A search domain plugged into the beam engine.
///
/// The engine never looks inside a state. It ranks states with
/// [`fitness`](Problem::fitness), suppresses duplicates through `Eq`
/// (with `Hash` steering the probe chain, so the usual law — equal
/// states hash identically — is load-bearing here), and grows the beam
/// with [`children`](Problem::children).
pub trait Problem: Sync {
    /// A candidate solution. Copied by value whenever it crosses the
    /// engine boundary; the engine keeps no references into caller
    /// memory past a call.
    type State: Clone + Eq + Hash + Send + Sync;

    /// Rank a state. Must be deterministic.
    ///
    /// Returning [`Fitness::PERFECT`] asks the search to stop at the
    /// end of the current generation.
    fn fitness(&self, state: &Self::State) -> Fitness;

    /// Call `emit` once per child of `parent`, in any order.
    ///
    /// May emit nothing for a terminal parent. The engine invokes this
    /// once per surviving parent per generation, always from a single
    /// thread, though different parents expand on different threads.
    fn children(&self, parent: &Self::State, emit: &mut dyn FnMut(Self::State));
}
