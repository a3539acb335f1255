//! Inventory bookkeeping and burn rules.
//!
//! Counts are unsigned by construction and every removal path validates
//! before it mutates, so a count can never go negative and a failed batch
//! never leaves the inventory half-drained.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::BurnConfig;
use crate::error::{Shortfall, ValidationError};
use crate::items::ItemKind;

/// Item-type to count mapping for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    counts: HashMap<ItemKind, u32>,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for an item (zero when absent).
    #[must_use]
    pub fn count(&self, item: ItemKind) -> u32 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    /// Total number of items across all types.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.counts.values().map(|count| u64::from(*count)).sum()
    }

    /// Whether no items remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|count| *count == 0)
    }

    /// Iterate non-zero counts in stable item order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        let mut entries: Vec<(ItemKind, u32)> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(item, count)| (*item, *count))
            .collect();
        entries.sort_by_key(|(item, _)| *item);
        entries.into_iter()
    }

    /// Add `qty` of an item.
    pub fn add(&mut self, item: ItemKind, qty: u32) {
        let entry = self.counts.entry(item).or_insert(0);
        *entry = entry.saturating_add(qty);
    }

    /// Remove `qty` of an item, failing without mutation when short.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InsufficientItems` when fewer than `qty`
    /// are held.
    pub fn remove(&mut self, item: ItemKind, qty: u32) -> Result<(), ValidationError> {
        let have = self.count(item);
        if have < qty {
            return Err(ValidationError::InsufficientItems {
                item,
                have,
                need: qty,
            });
        }
        self.set_count(item, have - qty);
        Ok(())
    }

    /// Remove a whole batch atomically: the full batch is validated before
    /// any count changes, so either everything is removed or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingRequirements` carrying every
    /// shortfall in the batch, not just the first.
    pub fn remove_batch(
        &mut self,
        batch: &HashMap<ItemKind, u32>,
    ) -> Result<(), ValidationError> {
        let shortfalls = self.shortfalls(batch);
        if !shortfalls.is_empty() {
            return Err(ValidationError::MissingRequirements(shortfalls));
        }
        for (item, qty) in batch {
            let have = self.count(*item);
            self.set_count(*item, have - qty);
        }
        Ok(())
    }

    /// Every requirement this inventory cannot cover, in stable item order.
    #[must_use]
    pub fn shortfalls(&self, requirements: &HashMap<ItemKind, u32>) -> Vec<Shortfall> {
        let mut missing: Vec<Shortfall> = requirements
            .iter()
            .filter_map(|(item, need)| {
                let have = self.count(*item);
                (have < *need).then_some(Shortfall {
                    item: *item,
                    have,
                    need: *need,
                })
            })
            .collect();
        missing.sort_by_key(|shortfall| shortfall.item);
        missing
    }

    /// Destroy the entire remaining inventory after a successful contract
    /// submission, returning what was destroyed.
    pub fn burn_on_submit(&mut self) -> Vec<(ItemKind, u32)> {
        let burned: Vec<(ItemKind, u32)> = self.iter_sorted().collect();
        self.counts.clear();
        burned
    }

    /// Day-end attrition: independently removes a configured share
    /// (default 30-50%) of each item type, returning the burned amounts.
    /// Survivor counts stay in `[0, pre]`.
    pub fn burn_partial_on_day_end<R: Rng>(
        &mut self,
        rng: &mut R,
        cfg: &BurnConfig,
    ) -> Vec<(ItemKind, u32)> {
        // Stable draw order keeps seeded runs reproducible.
        let held: Vec<(ItemKind, u32)> = self.iter_sorted().collect();
        let mut burned = Vec::new();
        for (item, count) in held {
            let pct = rng.gen_range(cfg.min_pct..=cfg.max_pct);
            let lost = count * pct / 100;
            if lost > 0 {
                self.set_count(item, count - lost);
                burned.push((item, lost));
            }
        }
        burned
    }

    fn set_count(&mut self, item: ItemKind, count: u32) {
        if count == 0 {
            self.counts.remove(&item);
        } else {
            self.counts.insert(item, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn stocked() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.add(ItemKind::Wheat, 10);
        inventory.add(ItemKind::Wood, 4);
        inventory.add(ItemKind::Stone, 2);
        inventory
    }

    #[test]
    fn remove_fails_without_mutation_when_short() {
        let mut inventory = stocked();
        let err = inventory.remove(ItemKind::Stone, 5).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientItems {
                item: ItemKind::Stone,
                have: 2,
                need: 5,
            }
        );
        assert_eq!(inventory.count(ItemKind::Stone), 2);
    }

    #[test]
    fn remove_batch_is_all_or_nothing() {
        let mut inventory = stocked();
        let batch = HashMap::from([(ItemKind::Wheat, 3), (ItemKind::Iron, 1)]);
        let err = inventory.remove_batch(&batch).unwrap_err();
        match err {
            ValidationError::MissingRequirements(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].item, ItemKind::Iron);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing was drained, including the coverable wheat line.
        assert_eq!(inventory.count(ItemKind::Wheat), 10);

        let affordable = HashMap::from([(ItemKind::Wheat, 3), (ItemKind::Wood, 4)]);
        inventory.remove_batch(&affordable).unwrap();
        assert_eq!(inventory.count(ItemKind::Wheat), 7);
        assert_eq!(inventory.count(ItemKind::Wood), 0);
    }

    #[test]
    fn shortfalls_reports_every_gap() {
        let inventory = stocked();
        let requirements = HashMap::from([
            (ItemKind::Wheat, 20),
            (ItemKind::Wood, 1),
            (ItemKind::Iron, 2),
        ]);
        let shortfalls = inventory.shortfalls(&requirements);
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[0].item, ItemKind::Wheat);
        assert_eq!(shortfalls[1].item, ItemKind::Iron);
    }

    #[test]
    fn burn_on_submit_empties_everything() {
        let mut inventory = stocked();
        let burned = inventory.burn_on_submit();
        assert!(inventory.is_empty());
        assert_eq!(burned.len(), 3);
        assert_eq!(inventory.total_items(), 0);
    }

    #[test]
    fn partial_burn_never_increases_counts() {
        let mut rng = SmallRng::seed_from_u64(99);
        let cfg = BurnConfig::default();
        for _ in 0..50 {
            let mut inventory = Inventory::new();
            inventory.add(ItemKind::Wheat, 17);
            inventory.add(ItemKind::Coal, 3);
            inventory.add(ItemKind::Iron, 1);
            let before: HashMap<ItemKind, u32> =
                inventory.iter_sorted().collect();
            inventory.burn_partial_on_day_end(&mut rng, &cfg);
            for (item, pre) in before {
                let post = inventory.count(item);
                assert!(post <= pre, "{} grew: {pre} -> {post}", item.asset_key());
            }
        }
    }

    #[test]
    fn partial_burn_takes_expected_share() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut inventory = Inventory::new();
        inventory.add(ItemKind::Wheat, 100);
        let burned = inventory.burn_partial_on_day_end(&mut rng, &BurnConfig::default());
        let lost = burned
            .iter()
            .find(|(item, _)| *item == ItemKind::Wheat)
            .map_or(0, |(_, qty)| *qty);
        assert!((30..=50).contains(&lost), "burned {lost} of 100");
        assert_eq!(inventory.count(ItemKind::Wheat), 100 - lost);
    }
}
