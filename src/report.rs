//! Result summaries printed by the domain binaries.

use std::collections::BTreeMap;
use std::fmt::Display;

use magpie_beam::Fitness;

/// Print the standard end-of-run summary: solution count, the best
/// record, and an ascending fitness histogram.
///
/// `perfect_as` is the score a perfect record counts as — the domain's
/// maximum attainable fitness — so the histogram stays on one scale.
pub fn print_summary<S: Display>(
    survivors: &[S],
    fitness: impl Fn(&S) -> Fitness,
    perfect_as: u32,
) {
    println!("{} solutions found", survivors.len());

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut best: Option<(&S, u32)> = None;
    for record in survivors {
        let raw = fitness(record);
        let score = if raw.is_perfect() { perfect_as } else { raw.get() };
        *counts.entry(score).or_default() += 1;
        if best.is_none_or(|(_, high)| score > high) {
            best = Some((record, score));
        }
    }

    if let Some((record, score)) = best {
        println!("best has fitness {score} {record}");
        println!("fitness counts:");
        for (score, count) in counts {
            println!("{score} {count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_survivors_print_without_panicking() {
        let survivors: Vec<u32> = Vec::new();
        print_summary(&survivors, |_| Fitness::new(1), 10);
    }

    #[test]
    fn summary_handles_perfect_records() {
        let survivors = vec![1u32, 2, 3];
        print_summary(
            &survivors,
            |n| {
                if *n == 3 {
                    Fitness::PERFECT
                } else {
                    Fitness::new(*n)
                }
            },
            99,
        );
    }
}
