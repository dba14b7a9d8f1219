//! Concurrency stress for the survivor table and the driver.
//!
//! Hammers the public insertion path from many OS threads and checks
//! the table never exceeds its capacity, never loses its internal
//! consistency, and still deduplicates under contention.

use std::thread;

use magpie_beam::{BeamParams, BeamTable, Fitness, Problem, beam_search};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Tagged(u64);

/// Every record ranks the same; survival is decided purely by the
/// probe chains.
struct FlatRank;

impl Problem for FlatRank {
    type State = Tagged;

    fn fitness(&self, _state: &Tagged) -> Fitness {
        Fitness::new(100)
    }

    fn children(&self, _parent: &Tagged, _emit: &mut dyn FnMut(Tagged)) {}
}

/// Eight seeds that each fan out into a large brood of distinct
/// records, all of equal fitness.
struct WideBrood {
    brood: u64,
}

impl Problem for WideBrood {
    type State = Tagged;

    fn fitness(&self, _state: &Tagged) -> Fitness {
        Fitness::new(100)
    }

    fn children(&self, parent: &Tagged, emit: &mut dyn FnMut(Tagged)) {
        for i in 0..self.brood {
            emit(Tagged(parent.0 * 1_000_000 + i + 1));
        }
    }
}

// ── Direct table contention ───────────────────────────────────────────────────

#[test]
fn hammered_table_stays_bounded() {
    let problem = FlatRank;
    let table = BeamTable::new(&problem, 1024, 3);

    thread::scope(|scope| {
        for thread_id in 0..8u64 {
            let table = &table;
            scope.spawn(move || {
                for i in 0..12_500u64 {
                    table.probe(Tagged(thread_id * 100_000 + i));
                }
            });
        }
    });

    let occupied = table.occupied();
    assert!(occupied <= 1024, "occupied {occupied} exceeds capacity");
    assert!(occupied > 0, "all 100k inserts were dropped");
    let survivors = table.into_survivors();
    assert_eq!(survivors.len(), occupied);
}

#[test]
fn contended_duplicates_collapse_to_one() {
    let problem = FlatRank;
    let table = BeamTable::new(&problem, 1024, 3);

    thread::scope(|scope| {
        for _ in 0..8 {
            let table = &table;
            scope.spawn(move || {
                for _ in 0..10_000 {
                    table.probe(Tagged(42));
                }
            });
        }
    });

    assert_eq!(table.occupied(), 1);
    assert_eq!(table.into_survivors(), vec![Tagged(42)]);
}

// ── Driver-level contention ───────────────────────────────────────────────────

#[test]
fn driver_survives_a_wide_generation() {
    let problem = WideBrood { brood: 12_500 };
    let seeds: Vec<Tagged> = (1..=8).map(Tagged).collect();
    let params = BeamParams {
        beam_size: 1024,
        generations: 1,
        probes: 3,
    };

    let outcome = beam_search(&problem, &seeds, &params);
    assert!(outcome.survivors.len() <= 1024);
    assert!(!outcome.survivors.is_empty());
    assert!(!outcome.perfect_found);
}
