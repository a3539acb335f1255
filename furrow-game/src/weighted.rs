//! Weighted categorical selection.
use rand::Rng;

/// Draw one entry with probability `weight / total` using a single uniform
/// roll and a cumulative scan. Zero-weight entries are never selected and
/// ties on accumulated weight resolve to input order. Returns `None` when
/// the total weight is zero.
pub fn choose_weighted<'a, T, R: Rng>(entries: &'a [(T, u32)], rng: &mut R) -> Option<&'a T> {
    let total_weight: u32 = entries.iter().map(|(_, weight)| *weight).sum();
    if total_weight == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total_weight);
    let mut current = 0;
    for (outcome, weight) in entries {
        current += *weight;
        if roll < current {
            return Some(outcome);
        }
    }

    entries.first().map(|(outcome, _)| outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashMap;

    #[test]
    fn zero_total_weight_yields_none() {
        let entries: [(&str, u32); 2] = [("a", 0), ("b", 0)];
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(choose_weighted(&entries, &mut rng), None);
    }

    #[test]
    fn zero_weight_entries_are_never_drawn() {
        let entries = [("never", 0), ("always", 5)];
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            assert_eq!(choose_weighted(&entries, &mut rng), Some(&"always"));
        }
    }

    #[test]
    fn single_entry_is_always_drawn() {
        let entries = [("only", 1)];
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(choose_weighted(&entries, &mut rng), Some(&"only"));
    }

    #[test]
    fn frequencies_track_weights() {
        let entries = [("a", 70), ("b", 20), ("c", 10)];
        let mut rng = SmallRng::seed_from_u64(0xFEED);
        let mut counts: HashMap<&str, u32> = HashMap::new();
        let samples = 10_000u32;
        for _ in 0..samples {
            let pick = choose_weighted(&entries, &mut rng).unwrap();
            *counts.entry(pick).or_insert(0) += 1;
        }
        let share = |key: &str| f64::from(counts[key]) / f64::from(samples);
        assert!((share("a") - 0.70).abs() < 0.02);
        assert!((share("b") - 0.20).abs() < 0.02);
        assert!((share("c") - 0.10).abs() < 0.02);
    }
}
