//! Tunable constants for leveling, upgrades and power-ups.
//!
//! Every section defaults to the stock balance so partial configuration
//! files only need to name the values they override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ClockSource, EffectPayload, LevelStat, PowerUpKind, UpgradeKind};

/// Complete configuration for one player's progression.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience curve and upgrade point grants.
    pub leveling: LevelingConfig,
    /// Innate bonus granted per level above the first.
    pub level_bonus: LevelBonusTable,
    /// Purchasable upgrade definitions.
    pub upgrades: UpgradeCatalog,
    /// Power-up clock and default effects.
    pub power_ups: PowerUpConfig,
}

impl ProgressionConfig {
    /// Checks that every value can drive the systems without producing
    /// degenerate curves or free upgrades.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.leveling.validate()?;
        self.level_bonus.validate()?;
        self.upgrades.validate()?;
        self.power_ups.catalog.validate()
    }
}

/// Experience curve and point grant parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingConfig {
    /// Experience required to leave level 1.
    pub base_experience: f64,
    /// Growth factor applied for every further level.
    pub growth: f64,
    /// Highest reachable level.
    pub max_level: u32,
    /// Points granted on an ordinary level-up.
    pub points_per_level: u32,
    /// Levels that grant [`LevelingConfig::milestone_points`] instead.
    pub milestone_levels: Vec<u32>,
    /// Points granted on reaching a milestone level.
    pub milestone_points: u32,
}

impl LevelingConfig {
    /// Whether reaching `level` grants milestone points.
    #[must_use]
    pub fn is_milestone(&self, level: u32) -> bool {
        self.milestone_levels.contains(&level)
    }

    /// Points granted for reaching `level`.
    #[must_use]
    pub fn points_for_level(&self, level: u32) -> u32 {
        if self.is_milestone(level) {
            self.milestone_points
        } else {
            self.points_per_level
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level == 0 {
            return Err(ConfigError::ZeroMaxLevel);
        }
        if !self.base_experience.is_finite() || self.base_experience < 1.0 {
            return Err(ConfigError::InvalidBaseExperience(self.base_experience));
        }
        if !self.growth.is_finite() || self.growth < 1.0 {
            return Err(ConfigError::InvalidGrowth(self.growth));
        }
        Ok(())
    }
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base_experience: 100.0,
            growth: 1.15,
            max_level: 50,
            points_per_level: 1,
            milestone_levels: vec![10, 20, 30, 40, 50],
            milestone_points: 2,
        }
    }
}

/// Innate bonus per level, independent of purchased upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelBonusTable {
    /// Damage bonus per level.
    pub damage: f64,
    /// Health bonus per level.
    pub health: f64,
    /// Speed bonus per level.
    pub speed: f64,
    /// Fire rate bonus per level.
    pub fire_rate: f64,
}

impl LevelBonusTable {
    /// Bonus per level for `stat`.
    #[must_use]
    pub const fn per_level(&self, stat: LevelStat) -> f64 {
        match stat {
            LevelStat::Damage => self.damage,
            LevelStat::Health => self.health,
            LevelStat::Speed => self.speed,
            LevelStat::FireRate => self.fire_rate,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for stat in LevelStat::ALL {
            let bonus = self.per_level(stat);
            if !bonus.is_finite() || bonus < 0.0 {
                return Err(ConfigError::InvalidLevelBonus { stat, bonus });
            }
        }
        Ok(())
    }
}

impl Default for LevelBonusTable {
    fn default() -> Self {
        Self {
            damage: 0.02,
            health: 0.05,
            speed: 0.01,
            fire_rate: 0.02,
        }
    }
}

/// Definition of a single purchasable upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    /// Highest purchasable level.
    pub max_level: u32,
    /// Points deducted per purchased level.
    pub cost_per_level: u32,
    /// Linear bonus added to the multiplier per level.
    pub bonus_per_level: f64,
}

impl UpgradeDefinition {
    /// Creates a new upgrade definition.
    #[must_use]
    pub const fn new(max_level: u32, cost_per_level: u32, bonus_per_level: f64) -> Self {
        Self {
            max_level,
            cost_per_level,
            bonus_per_level,
        }
    }
}

/// Catalog holding one definition per upgrade kind.
///
/// Decoding starts from the stock catalog, so a file may override a single
/// field of a single upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "UpgradeCatalogOverrides")]
pub struct UpgradeCatalog {
    /// Damage upgrade.
    pub damage: UpgradeDefinition,
    /// Speed upgrade.
    pub speed: UpgradeDefinition,
    /// Fire rate upgrade.
    pub fire_rate: UpgradeDefinition,
    /// Health upgrade.
    pub health: UpgradeDefinition,
    /// Regeneration upgrade.
    pub regeneration: UpgradeDefinition,
}

impl UpgradeCatalog {
    /// Definition for `kind`.
    #[must_use]
    pub const fn definition(&self, kind: UpgradeKind) -> &UpgradeDefinition {
        match kind {
            UpgradeKind::Damage => &self.damage,
            UpgradeKind::Speed => &self.speed,
            UpgradeKind::FireRate => &self.fire_rate,
            UpgradeKind::Health => &self.health,
            UpgradeKind::Regeneration => &self.regeneration,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in UpgradeKind::ALL {
            let definition = self.definition(kind);
            if definition.cost_per_level == 0 {
                return Err(ConfigError::ZeroUpgradeCost(kind));
            }
            let bonus = definition.bonus_per_level;
            if !bonus.is_finite() || bonus < 0.0 {
                return Err(ConfigError::InvalidUpgradeBonus { kind, bonus });
            }
        }
        Ok(())
    }
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        Self {
            damage: UpgradeDefinition::new(10, 1, 0.10),
            speed: UpgradeDefinition::new(10, 1, 0.05),
            fire_rate: UpgradeDefinition::new(10, 1, 0.08),
            health: UpgradeDefinition::new(10, 1, 0.15),
            regeneration: UpgradeDefinition::new(5, 2, 0.25),
        }
    }
}

/// Fields of one upgrade definition named by a configuration file.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct UpgradeOverride {
    max_level: Option<u32>,
    cost_per_level: Option<u32>,
    bonus_per_level: Option<f64>,
}

impl UpgradeOverride {
    fn apply(self, stock: UpgradeDefinition) -> UpgradeDefinition {
        UpgradeDefinition {
            max_level: self.max_level.unwrap_or(stock.max_level),
            cost_per_level: self.cost_per_level.unwrap_or(stock.cost_per_level),
            bonus_per_level: self.bonus_per_level.unwrap_or(stock.bonus_per_level),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct UpgradeCatalogOverrides {
    damage: UpgradeOverride,
    speed: UpgradeOverride,
    fire_rate: UpgradeOverride,
    health: UpgradeOverride,
    regeneration: UpgradeOverride,
}

impl From<UpgradeCatalogOverrides> for UpgradeCatalog {
    fn from(overrides: UpgradeCatalogOverrides) -> Self {
        let stock = Self::default();
        Self {
            damage: overrides.damage.apply(stock.damage),
            speed: overrides.speed.apply(stock.speed),
            fire_rate: overrides.fire_rate.apply(stock.fire_rate),
            health: overrides.health.apply(stock.health),
            regeneration: overrides.regeneration.apply(stock.regeneration),
        }
    }
}

/// Default duration and payload applied when a power-up is picked up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpDefinition {
    /// Effect lifetime in milliseconds.
    pub duration_ms: u64,
    /// Modifiers carried by the effect.
    pub effects: EffectPayload,
}

impl PowerUpDefinition {
    /// Effect lifetime.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Catalog holding one default definition per power-up kind.
///
/// Decoding starts from the stock catalog. An overridden `effects` table
/// replaces the stock payload of that kind as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PowerUpCatalogOverrides")]
pub struct PowerUpCatalog {
    /// Damage boost defaults.
    pub damage_boost: PowerUpDefinition,
    /// Speed boost defaults.
    pub speed_boost: PowerUpDefinition,
    /// Rapid fire defaults.
    pub rapid_fire: PowerUpDefinition,
    /// Shield defaults.
    pub shield: PowerUpDefinition,
    /// Health regeneration defaults.
    pub health_regen: PowerUpDefinition,
}

impl PowerUpCatalog {
    /// Definition for `kind`.
    #[must_use]
    pub const fn definition(&self, kind: PowerUpKind) -> &PowerUpDefinition {
        match kind {
            PowerUpKind::DamageBoost => &self.damage_boost,
            PowerUpKind::SpeedBoost => &self.speed_boost,
            PowerUpKind::RapidFire => &self.rapid_fire,
            PowerUpKind::Shield => &self.shield,
            PowerUpKind::HealthRegen => &self.health_regen,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in PowerUpKind::ALL {
            let effects = self.definition(kind).effects;
            let modifiers = [
                ("damage_multiplier", effects.damage_multiplier),
                ("speed_multiplier", effects.speed_multiplier),
                ("fire_rate_multiplier", effects.fire_rate_multiplier),
                ("health_regen_boost", effects.health_regen_boost),
            ];
            for (field, value) in modifiers {
                if let Some(value) = value.filter(|value| !value.is_finite() || *value < 0.0) {
                    return Err(ConfigError::InvalidPowerUpEffect { kind, field, value });
                }
            }
        }
        Ok(())
    }
}

impl Default for PowerUpCatalog {
    fn default() -> Self {
        Self {
            damage_boost: PowerUpDefinition {
                duration_ms: 10_000,
                effects: EffectPayload::NONE.with_damage_multiplier(2.0),
            },
            speed_boost: PowerUpDefinition {
                duration_ms: 8_000,
                effects: EffectPayload::NONE.with_speed_multiplier(1.5),
            },
            rapid_fire: PowerUpDefinition {
                duration_ms: 8_000,
                effects: EffectPayload::NONE.with_fire_rate_multiplier(1.5),
            },
            shield: PowerUpDefinition {
                duration_ms: 15_000,
                effects: EffectPayload::NONE.with_shield(),
            },
            health_regen: PowerUpDefinition {
                duration_ms: 10_000,
                effects: EffectPayload::NONE.with_health_regen_boost(5.0),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct PowerUpOverride {
    duration_ms: Option<u64>,
    effects: Option<EffectPayload>,
}

impl PowerUpOverride {
    fn apply(self, stock: PowerUpDefinition) -> PowerUpDefinition {
        PowerUpDefinition {
            duration_ms: self.duration_ms.unwrap_or(stock.duration_ms),
            effects: self.effects.unwrap_or(stock.effects),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct PowerUpCatalogOverrides {
    damage_boost: PowerUpOverride,
    speed_boost: PowerUpOverride,
    rapid_fire: PowerUpOverride,
    shield: PowerUpOverride,
    health_regen: PowerUpOverride,
}

impl From<PowerUpCatalogOverrides> for PowerUpCatalog {
    fn from(overrides: PowerUpCatalogOverrides) -> Self {
        let stock = Self::default();
        Self {
            damage_boost: overrides.damage_boost.apply(stock.damage_boost),
            speed_boost: overrides.speed_boost.apply(stock.speed_boost),
            rapid_fire: overrides.rapid_fire.apply(stock.rapid_fire),
            shield: overrides.shield.apply(stock.shield),
            health_regen: overrides.health_regen.apply(stock.health_regen),
        }
    }
}

/// Power-up clock and defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    /// Time base used to expire effects.
    pub clock: ClockSource,
    /// Defaults used when a power-up is collected without explicit parameters.
    pub catalog: PowerUpCatalog,
}

/// Reasons a configuration is rejected.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The maximum level must allow at least level 1.
    #[error("max_level must be at least 1")]
    ZeroMaxLevel,
    /// The base experience must be finite and at least 1 so no level is free.
    #[error("base_experience must be finite and at least 1.0, got {0}")]
    InvalidBaseExperience(f64),
    /// The growth factor must be finite and at least 1.
    #[error("growth must be finite and at least 1.0, got {0}")]
    InvalidGrowth(f64),
    /// Upgrades must cost at least one point.
    #[error("upgrade {0:?} must cost at least one point per level")]
    ZeroUpgradeCost(UpgradeKind),
    /// Upgrade bonuses must be finite and non-negative.
    #[error("upgrade {kind:?} has invalid bonus_per_level {bonus}")]
    InvalidUpgradeBonus {
        /// Offending upgrade.
        kind: UpgradeKind,
        /// Offending bonus.
        bonus: f64,
    },
    /// Level bonuses must be finite and non-negative.
    #[error("level bonus for {stat:?} is invalid: {bonus}")]
    InvalidLevelBonus {
        /// Offending stat.
        stat: LevelStat,
        /// Offending bonus.
        bonus: f64,
    },
    /// Power-up modifiers must be finite and non-negative.
    #[error("power-up {kind:?} has invalid {field} {value}")]
    InvalidPowerUpEffect {
        /// Offending power-up.
        kind: PowerUpKind,
        /// Name of the offending modifier.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}
