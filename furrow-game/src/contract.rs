//! Contract tiers, template catalog, and requirement validation.
//!
//! One canonical [`Tier`] serves both the daily-contract path and the case
//! path: the legacy "basic" difficulty reads as `Common` and "expert" as
//! `Epic`, accepted as serde aliases so either taxonomy deserializes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::ConfigError;
use crate::constants::DEFAULT_SPAWN_WEIGHT;
use crate::error::ValidationError;
use crate::inventory::Inventory;
use crate::items::ItemKind;
use crate::weighted::choose_weighted;

/// Reward tier shared by contracts and cases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[serde(alias = "basic")]
    Common,
    Advanced,
    #[serde(alias = "expert")]
    Epic,
}

impl Tier {
    pub const ALL: [Self; 3] = [Self::Common, Self::Advanced, Self::Epic];

    /// Stable string key used in logs and asset lookups.
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Advanced => "advanced",
            Self::Epic => "epic",
        }
    }
}

/// Snapshot of a drawn contract, pinned at draw time so later template
/// rebalances cannot change a live session's terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContract {
    pub template_id: String,
    pub tier: Tier,
    pub requirements: HashMap<ItemKind, u32>,
    pub reward_cents: i64,
    pub fame_points: u32,
}

/// A contract blueprint: what it demands and what it pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTemplate {
    pub id: String,
    pub tier: Tier,
    /// Items consumed on submission.
    pub requirements: HashMap<ItemKind, u32>,
    /// Currency reward in cents to avoid floating-point issues.
    pub reward_cents: i64,
    /// Fame points granted on submission.
    pub fame_points: u32,
    /// Relative draw weight within the tier pool.
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: u32,
}

const fn default_spawn_weight() -> u32 {
    DEFAULT_SPAWN_WEIGHT
}

impl ContractTemplate {
    /// Pin this template's terms for a live session.
    #[must_use]
    pub fn snapshot(&self) -> ActiveContract {
        ActiveContract {
            template_id: self.id.clone(),
            tier: self.tier,
            requirements: self.requirements.clone(),
            reward_cents: self.reward_cents,
            fame_points: self.fame_points,
        }
    }
}

/// Validated set of contract templates grouped by tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ContractTemplate>", into = "Vec<ContractTemplate>")]
pub struct ContractCatalog {
    templates: Vec<ContractTemplate>,
}

impl ContractCatalog {
    /// Build a catalog, validating every template and tier pool.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for duplicate ids, empty requirements, zero
    /// spawn weights, or a tier left without any template.
    pub fn new(templates: Vec<ContractTemplate>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.id.clone()) {
                return Err(ConfigError::DuplicateTemplate(template.id.clone()));
            }
            if template.requirements.is_empty() || template.requirements.values().all(|n| *n == 0)
            {
                return Err(ConfigError::EmptyRequirements(template.id.clone()));
            }
            if template.spawn_weight == 0 {
                return Err(ConfigError::ZeroSpawnWeight(template.id.clone()));
            }
        }
        for tier in Tier::ALL {
            if !templates.iter().any(|template| template.tier == tier) {
                return Err(ConfigError::EmptyTierPool { tier });
            }
        }
        Ok(Self { templates })
    }

    /// Built-in catalog used when no external template set is supplied.
    #[must_use]
    pub fn default_catalog() -> Self {
        let templates = vec![
            template(
                "sprout_supper",
                Tier::Common,
                &[(ItemKind::Wheat, 3), (ItemKind::Carrot, 2)],
                120,
                5,
                40,
            ),
            template(
                "kindling_run",
                Tier::Common,
                &[(ItemKind::Wood, 2)],
                100,
                4,
                35,
            ),
            template(
                "gravel_order",
                Tier::Common,
                &[(ItemKind::Stone, 3)],
                140,
                5,
                25,
            ),
            template(
                "market_bundle",
                Tier::Advanced,
                &[(ItemKind::Wheat, 5), (ItemKind::Pumpkin, 2), (ItemKind::Wood, 2)],
                420,
                12,
                30,
            ),
            template(
                "forge_supply",
                Tier::Advanced,
                &[(ItemKind::Stone, 4), (ItemKind::Coal, 2)],
                480,
                14,
                20,
            ),
            template(
                "harvest_feast",
                Tier::Epic,
                &[
                    (ItemKind::Pumpkin, 4),
                    (ItemKind::Carrot, 6),
                    (ItemKind::Wood, 3),
                ],
                1_500,
                35,
                12,
            ),
            template(
                "ironworks_charter",
                Tier::Epic,
                &[(ItemKind::Iron, 2), (ItemKind::Coal, 3), (ItemKind::Stone, 5)],
                2_000,
                45,
                8,
            ),
        ];
        Self::new(templates).expect("built-in catalog is valid")
    }

    /// All templates of one tier, in declaration order.
    #[must_use]
    pub fn tier_pool(&self, tier: Tier) -> Vec<&ContractTemplate> {
        self.templates
            .iter()
            .filter(|template| template.tier == tier)
            .collect()
    }

    /// Find a template by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ContractTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Draw one template of `tier` weighted by spawn weight.
    #[must_use]
    pub fn roll_template<R: Rng>(&self, tier: Tier, rng: &mut R) -> Option<&ContractTemplate> {
        let pool = self.tier_pool(tier);
        let weighted: Vec<(usize, u32)> = pool
            .iter()
            .enumerate()
            .map(|(idx, template)| (idx, template.spawn_weight))
            .collect();
        choose_weighted(&weighted, rng).and_then(|idx| pool.get(*idx).copied())
    }
}

impl TryFrom<Vec<ContractTemplate>> for ContractCatalog {
    type Error = ConfigError;

    fn try_from(templates: Vec<ContractTemplate>) -> Result<Self, Self::Error> {
        Self::new(templates)
    }
}

impl From<ContractCatalog> for Vec<ContractTemplate> {
    fn from(catalog: ContractCatalog) -> Self {
        catalog.templates
    }
}

/// Check an inventory against contract requirements, reporting every
/// shortfall rather than just the first mismatch.
///
/// # Errors
///
/// Returns `ValidationError::MissingRequirements` with the complete
/// shortfall list when any requirement is uncovered.
pub fn validate_contract(
    inventory: &Inventory,
    requirements: &HashMap<ItemKind, u32>,
) -> Result<(), ValidationError> {
    let shortfalls = inventory.shortfalls(requirements);
    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingRequirements(shortfalls))
    }
}

fn template(
    id: &str,
    tier: Tier,
    requirements: &[(ItemKind, u32)],
    reward_cents: i64,
    fame_points: u32,
    spawn_weight: u32,
) -> ContractTemplate {
    ContractTemplate {
        id: id.to_string(),
        tier,
        requirements: requirements.iter().copied().collect(),
        reward_cents,
        fame_points,
        spawn_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn default_catalog_covers_every_tier() {
        let catalog = ContractCatalog::default_catalog();
        for tier in Tier::ALL {
            assert!(!catalog.tier_pool(tier).is_empty(), "{}", tier.asset_key());
        }
    }

    #[test]
    fn legacy_tier_names_deserialize() {
        let basic: Tier = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(basic, Tier::Common);
        let expert: Tier = serde_json::from_str("\"expert\"").unwrap();
        assert_eq!(expert, Tier::Epic);
        // Canonical names round-trip unchanged.
        assert_eq!(serde_json::to_string(&Tier::Epic).unwrap(), "\"epic\"");
    }

    #[test]
    fn duplicate_template_ids_are_rejected() {
        let mut templates: Vec<ContractTemplate> =
            ContractCatalog::default_catalog().into();
        let clone = templates[0].clone();
        templates.push(clone);
        let err = ContractCatalog::new(templates).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTemplate(_)));
    }

    #[test]
    fn roll_template_stays_within_tier() {
        let catalog = ContractCatalog::default_catalog();
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..100 {
            let template = catalog.roll_template(Tier::Epic, &mut rng).unwrap();
            assert_eq!(template.tier, Tier::Epic);
        }
    }

    #[test]
    fn validation_lists_all_shortfalls() {
        let catalog = ContractCatalog::default_catalog();
        let template = catalog.find("ironworks_charter").unwrap();
        let inventory = Inventory::new();
        let err = validate_contract(&inventory, &template.requirements).unwrap_err();
        match err {
            ValidationError::MissingRequirements(shortfalls) => {
                assert_eq!(shortfalls.len(), template.requirements.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_passes_with_surplus() {
        let catalog = ContractCatalog::default_catalog();
        let template = catalog.find("kindling_run").unwrap();
        let mut inventory = Inventory::new();
        inventory.add(ItemKind::Wood, 10);
        validate_contract(&inventory, &template.requirements).unwrap();
    }
}
