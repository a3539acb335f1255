//! Economy configuration with serde defaults and validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CASE_WINDOW_HOURS, CHEST_FAME_THRESHOLD, CHEST_REWARD_MAX_CENTS, CHEST_REWARD_MIN_CENTS,
    DAILY_CASE_CAP, DAY_END_BURN_MAX_PCT, DAY_END_BURN_MIN_PCT, DECOY_SEQUENCE_LEN,
    DECOY_SPLICE_INDEX, ENTRY_FEE_CENTS_DEFAULT, STAMINA_MAX_DEFAULT, TIER_WEIGHT_ADVANCED,
    TIER_WEIGHT_COMMON, TIER_WEIGHT_EPIC,
};
use crate::contract::Tier;

/// Errors raised when economy configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} bounds invalid (min {min} > max {max})")]
    RangeInverted {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{field} must not exceed {max} (got {value})")]
    MaxViolation {
        field: &'static str,
        max: i64,
        value: i64,
    },
    #[error("tier weights sum to zero")]
    ZeroTierWeights,
    #[error("decoy splice index {index} outside sequence of {len}")]
    DecoySpliceOutOfRange { index: usize, len: usize },
    #[error("tier {tier:?} has no contract templates")]
    EmptyTierPool { tier: Tier },
    #[error("template {0} has no requirements")]
    EmptyRequirements(String),
    #[error("template {0} has zero spawn weight")]
    ZeroSpawnWeight(String),
    #[error("duplicate template id {0}")]
    DuplicateTemplate(String),
}

/// Relative draw weights for the case tier roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierWeights {
    pub common: u32,
    pub advanced: u32,
    pub epic: u32,
}

impl TierWeights {
    /// Weight table in draw order.
    #[must_use]
    pub const fn as_table(self) -> [(Tier, u32); 3] {
        [
            (Tier::Common, self.common),
            (Tier::Advanced, self.advanced),
            (Tier::Epic, self.epic),
        ]
    }

    #[must_use]
    pub const fn total(self) -> u32 {
        self.common + self.advanced + self.epic
    }
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            common: TIER_WEIGHT_COMMON,
            advanced: TIER_WEIGHT_ADVANCED,
            epic: TIER_WEIGHT_EPIC,
        }
    }
}

/// Case opening policy: cap, rolling window, tier odds, decoy playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseConfig {
    #[serde(default = "CaseConfig::default_daily_cap")]
    pub daily_cap: u32,
    #[serde(default = "CaseConfig::default_window_hours")]
    pub window_hours: i64,
    #[serde(default)]
    pub tier_weights: TierWeights,
    #[serde(default = "CaseConfig::default_decoy_len")]
    pub decoy_len: usize,
    #[serde(default = "CaseConfig::default_decoy_splice_index")]
    pub decoy_splice_index: usize,
}

impl CaseConfig {
    #[must_use]
    pub const fn default_daily_cap() -> u32 {
        DAILY_CASE_CAP
    }

    #[must_use]
    pub const fn default_window_hours() -> i64 {
        CASE_WINDOW_HOURS
    }

    #[must_use]
    pub const fn default_decoy_len() -> usize {
        DECOY_SEQUENCE_LEN
    }

    #[must_use]
    pub const fn default_decoy_splice_index() -> usize {
        DECOY_SPLICE_INDEX
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.daily_cap < 1 {
            return Err(ConfigError::MinViolation {
                field: "daily_cap",
                min: 1,
                value: i64::from(self.daily_cap),
            });
        }
        if self.window_hours < 1 {
            return Err(ConfigError::MinViolation {
                field: "window_hours",
                min: 1,
                value: self.window_hours,
            });
        }
        if self.tier_weights.total() == 0 {
            return Err(ConfigError::ZeroTierWeights);
        }
        if self.decoy_splice_index >= self.decoy_len {
            return Err(ConfigError::DecoySpliceOutOfRange {
                index: self.decoy_splice_index,
                len: self.decoy_len,
            });
        }
        Ok(())
    }
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            daily_cap: Self::default_daily_cap(),
            window_hours: Self::default_window_hours(),
            tier_weights: TierWeights::default(),
            decoy_len: Self::default_decoy_len(),
            decoy_splice_index: Self::default_decoy_splice_index(),
        }
    }
}

/// Day-end attrition band, in whole percent of each item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnConfig {
    pub min_pct: u32,
    pub max_pct: u32,
}

impl BurnConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_pct > self.max_pct {
            return Err(ConfigError::RangeInverted {
                field: "burn_pct",
                min: i64::from(self.min_pct),
                max: i64::from(self.max_pct),
            });
        }
        if self.max_pct > 100 {
            return Err(ConfigError::MaxViolation {
                field: "burn_pct",
                max: 100,
                value: i64::from(self.max_pct),
            });
        }
        Ok(())
    }
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            min_pct: DAY_END_BURN_MIN_PCT,
            max_pct: DAY_END_BURN_MAX_PCT,
        }
    }
}

/// Treasure chest redemption: threshold and reward band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestConfig {
    #[serde(default = "ChestConfig::default_fame_threshold")]
    pub fame_threshold: u32,
    #[serde(default = "ChestConfig::default_reward_min_cents")]
    pub reward_min_cents: i64,
    #[serde(default = "ChestConfig::default_reward_max_cents")]
    pub reward_max_cents: i64,
}

impl ChestConfig {
    #[must_use]
    pub const fn default_fame_threshold() -> u32 {
        CHEST_FAME_THRESHOLD
    }

    #[must_use]
    pub const fn default_reward_min_cents() -> i64 {
        CHEST_REWARD_MIN_CENTS
    }

    #[must_use]
    pub const fn default_reward_max_cents() -> i64 {
        CHEST_REWARD_MAX_CENTS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fame_threshold < 1 {
            return Err(ConfigError::MinViolation {
                field: "fame_threshold",
                min: 1,
                value: i64::from(self.fame_threshold),
            });
        }
        if self.reward_min_cents > self.reward_max_cents {
            return Err(ConfigError::RangeInverted {
                field: "chest_reward_cents",
                min: self.reward_min_cents,
                max: self.reward_max_cents,
            });
        }
        if self.reward_min_cents < 0 {
            return Err(ConfigError::MinViolation {
                field: "chest_reward_cents",
                min: 0,
                value: self.reward_min_cents,
            });
        }
        Ok(())
    }
}

impl Default for ChestConfig {
    fn default() -> Self {
        Self {
            fame_threshold: Self::default_fame_threshold(),
            reward_min_cents: Self::default_reward_min_cents(),
            reward_max_cents: Self::default_reward_max_cents(),
        }
    }
}

/// Top-level economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "EconomyConfig::default_stamina_max")]
    pub stamina_max: u32,
    #[serde(default)]
    pub case: CaseConfig,
    #[serde(default)]
    pub burn: BurnConfig,
    #[serde(default)]
    pub chest: ChestConfig,
    #[serde(default = "EconomyConfig::default_entry_fee_cents")]
    pub entry_fee_cents: i64,
}

impl EconomyConfig {
    #[must_use]
    pub const fn default_stamina_max() -> u32 {
        STAMINA_MAX_DEFAULT
    }

    #[must_use]
    pub const fn default_entry_fee_cents() -> i64 {
        ENTRY_FEE_CENTS_DEFAULT
    }

    /// Get the default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stamina_max < 1 {
            return Err(ConfigError::MinViolation {
                field: "stamina_max",
                min: 1,
                value: i64::from(self.stamina_max),
            });
        }
        if self.entry_fee_cents < 0 {
            return Err(ConfigError::MinViolation {
                field: "entry_fee_cents",
                min: 0,
                value: self.entry_fee_cents,
            });
        }
        self.case.validate()?;
        self.burn.validate()?;
        self.chest.validate()?;
        Ok(())
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            stamina_max: Self::default_stamina_max(),
            case: CaseConfig::default(),
            burn: BurnConfig::default(),
            chest: ChestConfig::default(),
            entry_fee_cents: Self::default_entry_fee_cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        EconomyConfig::default_config().validate().unwrap();
    }

    #[test]
    fn inverted_burn_band_is_rejected() {
        let mut cfg = EconomyConfig::default_config();
        cfg.burn = BurnConfig {
            min_pct: 60,
            max_pct: 40,
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::RangeInverted {
                field: "burn_pct",
                min: 60,
                max: 40,
            })
        );
    }

    #[test]
    fn zero_tier_weights_are_rejected() {
        let mut cfg = EconomyConfig::default_config();
        cfg.case.tier_weights = TierWeights {
            common: 0,
            advanced: 0,
            epic: 0,
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTierWeights));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EconomyConfig = serde_json::from_str(r#"{"stamina_max": 80}"#).unwrap();
        assert_eq!(cfg.stamina_max, 80);
        assert_eq!(cfg.case.daily_cap, 3);
        assert_eq!(cfg.chest.fame_threshold, 100);
        cfg.validate().unwrap();
    }
}
