//! Fitness-ranked survivor table with lock-free concurrent insertion.
//!
//! One `AtomicU32` fitness word per slot serves simultaneously as
//! presence bit (zero = empty), priority, and lock (`u32::MAX` = held).
//! A slot's record is only touched by a thread holding its lock, and a
//! committed record is published by the release-store of its fitness
//! word, so any thread that reads a live word also sees the record that
//! produced it.
//!
//! Insertion walks a bounded double-hash probe chain. A candidate that
//! outranks an incumbent swaps in and the incumbent carries on down the
//! remainder of the chain; a candidate that finds no home within the
//! probe budget is dropped. That silent drop is the table's only
//! admission control; a short budget gives low-fitness records more
//! chance to ride out transient collisions.

use std::cell::UnsafeCell;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use fnv::FnvHasher;
use rayon::prelude::*;

use crate::fitness::{EMPTY_WORD, Fitness, LOCKED_WORD};
use crate::problem::Problem;

/// Smallest usable capacity. Below this the double-hash stride (at most
/// 13) stops being a useful secondary walk; smaller requests are
/// clamped up.
pub const MIN_CAPACITY: usize = 17;

// ── Slot protocol ────────────────────────────────────────────────────────────

/// Decoded state of a slot's fitness word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Empty,
    Locked,
    Live(Fitness),
}

/// One slot's fitness word.
struct SlotWord(AtomicU32);

impl SlotWord {
    const fn new() -> Self {
        Self(AtomicU32::new(EMPTY_WORD))
    }

    fn state(&self) -> SlotState {
        match self.0.load(Ordering::Acquire) {
            EMPTY_WORD => SlotState::Empty,
            LOCKED_WORD => SlotState::Locked,
            word => SlotState::Live(Fitness::from_word(word)),
        }
    }

    /// Current word, waiting out any in-flight lock.
    fn settle(&self) -> u32 {
        loop {
            let word = self.0.load(Ordering::Acquire);
            if word != LOCKED_WORD {
                return word;
            }
            std::hint::spin_loop();
        }
    }

    /// Swing the word from `expected` to the lock sentinel.
    ///
    /// If the word moved under us the expectation is refreshed and the
    /// CAS retried, so the caller always ends up holding the lock.
    /// Returns the word the slot held at the moment it was locked,
    /// which may differ from `expected`.
    fn acquire(&self, mut expected: u32) -> u32 {
        loop {
            match self.0.compare_exchange_weak(
                expected,
                LOCKED_WORD,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return expected,
                Err(observed) if observed != LOCKED_WORD => expected = observed,
                Err(_) => {}
            }
            std::hint::spin_loop();
        }
    }

    /// Store `word`, releasing the lock and publishing any record
    /// written while it was held.
    fn release(&self, word: u32) {
        self.0.store(word, Ordering::Release);
    }
}

// ── Table ────────────────────────────────────────────────────────────────────

/// Probe hash of a record: FNV-1a over the state's `Hash` image.
fn record_hash<S: Hash>(state: &S) -> u64 {
    let mut hasher = FnvHasher::default();
    state.hash(&mut hasher);
    hasher.finish()
}

/// Bounded survivor table for one search generation.
///
/// All insertion goes through [`probe`](BeamTable::probe), which takes
/// `&self` and is safe to call from many threads at once. Reading the
/// table back (expansion, compaction) requires exclusive access, which
/// the borrow checker enforces via `&mut self` / `self` receivers.
pub struct BeamTable<'p, P: Problem> {
    problem: &'p P,
    words: Box<[SlotWord]>,
    records: Box<[UnsafeCell<Option<P::State>>]>,
    probes: usize,
    perfect: AtomicBool,
}

// SAFETY: a record cell is only written by the thread holding its slot
// lock, and only read either under that lock or after all probing has
// quiesced (guarded by `&mut self`). States are `Send + Sync` by the
// `Problem` bounds.
unsafe impl<P: Problem> Sync for BeamTable<'_, P> {}

impl<'p, P: Problem> BeamTable<'p, P> {
    /// Allocate an empty table of (at least) `beam_size` slots.
    pub fn new(problem: &'p P, beam_size: usize, probes: usize) -> Self {
        let capacity = beam_size.max(MIN_CAPACITY);
        Self {
            problem,
            words: (0..capacity).map(|_| SlotWord::new()).collect(),
            records: (0..capacity).map(|_| UnsafeCell::new(None)).collect(),
            probes,
            perfect: AtomicBool::new(false),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Number of committed records.
    pub fn occupied(&self) -> usize {
        self.words
            .iter()
            .filter(|word| matches!(word.state(), SlotState::Live(_)))
            .count()
    }

    /// Whether any probed candidate carried [`Fitness::PERFECT`].
    pub fn perfect_found(&self) -> bool {
        self.perfect.load(Ordering::Acquire)
    }

    /// Offer one candidate to the table.
    ///
    /// Walks up to `probes` slots of the candidate's chain. At each
    /// slot: an empty slot takes the candidate; a lower-fitness
    /// incumbent is swapped out and carries on down the chain in the
    /// candidate's place; an equal-fitness incumbent is compared and
    /// the candidate dropped if it is a duplicate. A candidate that
    /// exhausts the budget is dropped silently.
    pub fn probe(&self, candidate: P::State) {
        let mut current = candidate;
        let mut fitness = self.problem.fitness(&current);
        if fitness.is_perfect() {
            self.perfect.store(true, Ordering::Release);
        }

        let hash = record_hash(&current);
        let capacity = self.capacity() as u64;
        let stride = 13 - hash % 13;
        let mut index = (hash % capacity) as usize;

        for _ in 0..self.probes {
            let word = &self.words[index];
            let mut seen = word.settle();
            let mut held = false;

            if seen == EMPTY_WORD {
                seen = word.acquire(EMPTY_WORD);
                held = true;
                if seen == EMPTY_WORD {
                    // SAFETY: lock held; no other thread touches the cell.
                    unsafe {
                        *self.records[index].get() = Some(current);
                    }
                    word.release(fitness.word());
                    return;
                }
            }

            if seen < fitness.word() {
                if !held {
                    seen = word.acquire(seen);
                    held = true;
                }
                if seen < fitness.word() {
                    // SAFETY: lock held.
                    let displaced = unsafe { (*self.records[index].get()).replace(current) };
                    word.release(fitness.word());
                    // The incumbent becomes the candidate for the rest
                    // of the chain; its fitness is the word it sat under.
                    current = displaced.expect("live slot without a record");
                    fitness = Fitness::from_word(seen);
                    index = Self::step(index, stride, capacity);
                    continue;
                }
            }

            if seen == fitness.word() {
                if !held {
                    seen = word.acquire(seen);
                    held = true;
                }
                if seen == fitness.word() {
                    // SAFETY: lock held.
                    let resident = unsafe { (*self.records[index].get()).as_ref() }
                        .expect("live slot without a record");
                    let duplicate = *resident == current;
                    word.release(seen);
                    held = false;
                    if duplicate {
                        return;
                    }
                }
            }

            if held {
                word.release(seen);
            }
            index = Self::step(index, stride, capacity);
        }
        // Probe budget exhausted: the candidate is dropped.
    }

    fn step(index: usize, stride: u64, capacity: u64) -> usize {
        ((index as u64 + stride) % capacity) as usize
    }

    /// Expand every committed record into `next`, parents distributed
    /// across the rayon pool. A single parent's expansion never splits
    /// across workers.
    ///
    /// Takes `&mut self` so no probe can run against this table while
    /// it serves as the read-only parent source.
    pub fn par_expand(&mut self, next: &BeamTable<'_, P>) {
        let parents = &*self;
        (0..parents.capacity()).into_par_iter().for_each(|index| {
            if let Some(parent) = parents.record(index) {
                parents
                    .problem
                    .children(parent, &mut |child| next.probe(child));
            }
        });
    }

    /// Shared read of a slot's record.
    ///
    /// Sound only while no probe can run on this table; callers reach
    /// this through `&mut self` receivers.
    fn record(&self, index: usize) -> Option<&P::State> {
        // SAFETY: see above; a committed record is published by the
        // release-store of its fitness word before any quiescent read.
        unsafe { (*self.records[index].get()).as_ref() }
    }

    /// Compact the committed records into a dense result set,
    /// consuming the table.
    pub fn into_survivors(self) -> Vec<P::State> {
        self.records
            .into_vec()
            .into_iter()
            .filter_map(UnsafeCell::into_inner)
            .collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Test record with a scripted rank; every record hashes onto the
    /// same probe chain so collisions are deterministic.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Keyed {
        rank: u32,
        tag: u64,
    }

    impl Hash for Keyed {
        fn hash<H: Hasher>(&self, state: &mut H) {
            state.write_u64(0);
        }
    }

    struct RankOnly;

    impl Problem for RankOnly {
        type State = Keyed;

        fn fitness(&self, state: &Keyed) -> Fitness {
            if state.rank == u32::MAX - 1 {
                Fitness::PERFECT
            } else {
                Fitness::new(state.rank)
            }
        }

        fn children(&self, _parent: &Keyed, _emit: &mut dyn FnMut(Keyed)) {}
    }

    fn keyed(rank: u32, tag: u64) -> Keyed {
        Keyed { rank, tag }
    }

    #[test]
    fn table_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BeamTable<'static, RankOnly>>();
    }

    #[test]
    fn undersized_request_is_clamped() {
        let table = BeamTable::new(&RankOnly, 4, 3);
        assert_eq!(table.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn insert_into_empty_slot() {
        let table = BeamTable::new(&RankOnly, 17, 3);
        table.probe(keyed(5, 1));
        assert_eq!(table.occupied(), 1);
        assert_eq!(table.into_survivors(), vec![keyed(5, 1)]);
    }

    #[test]
    fn duplicate_is_dropped() {
        let table = BeamTable::new(&RankOnly, 17, 3);
        table.probe(keyed(5, 1));
        table.probe(keyed(5, 1));
        assert_eq!(table.occupied(), 1);
    }

    #[test]
    fn equal_rank_distinct_records_share_a_chain() {
        let table = BeamTable::new(&RankOnly, 17, 3);
        table.probe(keyed(5, 1));
        table.probe(keyed(5, 2));
        assert_eq!(table.occupied(), 2);
    }

    #[test]
    fn overfull_chain_evicts_the_minimum() {
        let problem = RankOnly;
        let table = BeamTable::new(&problem, 17, 17);
        for rank in 1..=18 {
            table.probe(keyed(rank, u64::from(rank)));
        }
        let mut ranks: Vec<u32> = table.into_survivors().into_iter().map(|k| k.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (2..=18).collect::<Vec<_>>());
    }

    #[test]
    fn displacement_replaces_a_chain_resident() {
        // One probe only: the winner must land exactly on the loser's slot.
        let table = BeamTable::new(&RankOnly, 17, 1);
        table.probe(keyed(3, 1));
        table.probe(keyed(9, 2));
        let survivors = table.into_survivors();
        assert_eq!(survivors, vec![keyed(9, 2)]);
    }

    #[test]
    fn lower_fitness_candidate_leaves_resident_alone() {
        let table = BeamTable::new(&RankOnly, 17, 1);
        table.probe(keyed(9, 1));
        table.probe(keyed(3, 2));
        assert_eq!(table.into_survivors(), vec![keyed(9, 1)]);
    }

    #[test]
    fn chain_holds_no_equal_pair() {
        let table = BeamTable::new(&RankOnly, 17, 17);
        for tag in 0..40u64 {
            // Half the probes are repeats.
            table.probe(keyed(7, tag % 20));
        }
        let survivors = table.into_survivors();
        for (i, a) in survivors.iter().enumerate() {
            for b in &survivors[i + 1..] {
                assert_ne!(a, b, "duplicate records committed on one chain");
            }
        }
    }

    #[test]
    fn committed_words_match_their_records() {
        let problem = RankOnly;
        let table = BeamTable::new(&problem, 17, 5);
        for rank in 1..=30 {
            table.probe(keyed(rank % 11 + 1, u64::from(rank)));
        }
        for index in 0..table.capacity() {
            match table.words[index].state() {
                SlotState::Live(fitness) => {
                    let record = table.record(index).expect("live word, empty cell");
                    assert_eq!(fitness, problem.fitness(record));
                }
                SlotState::Empty => assert!(table.record(index).is_none()),
                SlotState::Locked => panic!("lock left held after probes returned"),
            }
        }
    }

    #[test]
    fn perfect_candidate_sets_the_latch() {
        let table = BeamTable::new(&RankOnly, 17, 3);
        assert!(!table.perfect_found());
        table.probe(keyed(u32::MAX - 1, 1));
        assert!(table.perfect_found());
    }

    #[test]
    fn perfect_latch_survives_probe_exhaustion() {
        // Zero probes: the record is dropped, the signal still lands.
        let table = BeamTable::new(&RankOnly, 17, 0);
        table.probe(keyed(u32::MAX - 1, 1));
        assert!(table.perfect_found());
        assert_eq!(table.occupied(), 0);
    }

    #[test]
    fn concurrent_probing_leaves_no_lock_behind() {
        use std::thread;

        let problem = RankOnly;
        let table = BeamTable::new(&problem, 64, 3);
        thread::scope(|scope| {
            for thread_id in 0..8u64 {
                let table = &table;
                scope.spawn(move || {
                    for i in 0..5_000u64 {
                        table.probe(keyed(100, thread_id * 10_000 + i));
                    }
                });
            }
        });
        assert!(table.occupied() <= table.capacity());
        for index in 0..table.capacity() {
            assert_ne!(
                table.words[index].state(),
                SlotState::Locked,
                "slot {index} still locked after all probes returned"
            );
        }
    }
}
