#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rampart progression engine.
//!
//! This crate defines the vocabulary that connects adapters, the session that
//! owns a player's progression, and the pure systems that implement leveling,
//! upgrades and timed power-ups. Adapters submit [`Command`] values describing
//! desired mutations, the session executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values describing what changed.
//! Everything that crosses a persistence boundary lives in [`snapshot`], and
//! every tunable constant lives in [`config`].

pub mod config;
pub mod snapshot;

use std::{
    collections::BTreeMap,
    fmt,
    marker::PhantomData,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{
    de::DeserializeOwned, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer,
};

pub use config::{
    ConfigError, LevelBonusTable, LevelingConfig, PowerUpCatalog, PowerUpConfig,
    PowerUpDefinition, ProgressionConfig, UpgradeCatalog, UpgradeDefinition,
};
pub use snapshot::{
    clamp_count, wire_count, ActivePowerUpSnapshot, PowerUpSnapshot, ProgressionSnapshot,
    UpgradeLedgerSnapshot,
};

/// Closed enumeration whose variants index a dense, fixed-size table.
pub trait ClosedKind: Copy + Ord + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Every variant in declaration order.
    const VARIANTS: &'static [Self];

    /// Dense position of the variant within [`ClosedKind::VARIANTS`].
    fn slot(self) -> usize;
}

/// Fixed-size table holding one value per variant of a closed kind.
///
/// The table serializes as a `{kind: value}` map. Kinds missing from a decoded
/// map are filled with `T::default()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindTable<K, T, const N: usize> {
    values: [T; N],
    kind: PhantomData<K>,
}

/// Table holding one value per [`UpgradeKind`].
pub type UpgradeTable<T> = KindTable<UpgradeKind, T, { UpgradeKind::COUNT }>;

/// Table holding one value per [`PowerUpKind`].
pub type PowerUpTable<T> = KindTable<PowerUpKind, T, { PowerUpKind::COUNT }>;

impl<K: ClosedKind, T, const N: usize> KindTable<K, T, N> {
    /// Builds a table by evaluating `f` for every variant in declaration order.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(K) -> T) -> Self {
        Self {
            values: std::array::from_fn(|slot| f(K::VARIANTS[slot])),
            kind: PhantomData,
        }
    }

    /// Returns the value stored for `kind`.
    #[must_use]
    pub fn get(&self, kind: K) -> &T {
        &self.values[kind.slot()]
    }

    /// Returns a mutable reference to the value stored for `kind`.
    pub fn get_mut(&mut self, kind: K) -> &mut T {
        &mut self.values[kind.slot()]
    }

    /// Replaces the value stored for `kind`.
    pub fn set(&mut self, kind: K, value: T) {
        self.values[kind.slot()] = value;
    }

    /// Iterates over every kind and its value in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        K::VARIANTS.iter().copied().zip(self.values.iter())
    }

    /// Iterates over the stored values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.values.iter()
    }
}

impl<K: ClosedKind, T: Default, const N: usize> Default for KindTable<K, T, N> {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| T::default()),
            kind: PhantomData,
        }
    }
}

impl<K: ClosedKind, T: Serialize, const N: usize> Serialize for KindTable<K, T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(N))?;
        for (kind, value) in self.iter() {
            map.serialize_entry(&kind, value)?;
        }
        map.end()
    }
}

impl<'de, K, T, const N: usize> Deserialize<'de> for KindTable<K, T, N>
where
    K: ClosedKind,
    T: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<K, T>::deserialize(deserializer)?;
        let mut table = Self::default();
        for (kind, value) in entries {
            table.set(kind, value);
        }
        Ok(table)
    }
}

/// Permanent stat categories that can be purchased with upgrade points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradeKind {
    /// Increases outgoing damage.
    Damage,
    /// Increases movement speed.
    Speed,
    /// Increases the rate of fire.
    FireRate,
    /// Increases maximum health.
    Health,
    /// Increases health regeneration.
    Regeneration,
}

impl UpgradeKind {
    /// Number of upgrade kinds.
    pub const COUNT: usize = 5;

    /// Every upgrade kind in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Damage,
        Self::Speed,
        Self::FireRate,
        Self::Health,
        Self::Regeneration,
    ];

    /// Human readable label used by adapters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Speed => "speed",
            Self::FireRate => "fire rate",
            Self::Health => "health",
            Self::Regeneration => "regeneration",
        }
    }
}

impl ClosedKind for UpgradeKind {
    const VARIANTS: &'static [Self] = &Self::ALL;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Temporary power-ups a player may collect during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    /// Temporarily multiplies outgoing damage.
    DamageBoost,
    /// Temporarily multiplies movement speed.
    SpeedBoost,
    /// Temporarily multiplies the rate of fire.
    RapidFire,
    /// Absorbs exactly one incoming hit.
    Shield,
    /// Temporarily adds health regeneration.
    HealthRegen,
}

impl PowerUpKind {
    /// Number of power-up kinds.
    pub const COUNT: usize = 5;

    /// Every power-up kind in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::DamageBoost,
        Self::SpeedBoost,
        Self::RapidFire,
        Self::Shield,
        Self::HealthRegen,
    ];

    /// Human readable label used by adapters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DamageBoost => "damage boost",
            Self::SpeedBoost => "speed boost",
            Self::RapidFire => "rapid fire",
            Self::Shield => "shield",
            Self::HealthRegen => "health regen",
        }
    }
}

impl ClosedKind for PowerUpKind {
    const VARIANTS: &'static [Self] = &Self::ALL;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Stats that receive an innate bonus for every level above the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelStat {
    /// Outgoing damage.
    Damage,
    /// Maximum health.
    Health,
    /// Movement speed.
    Speed,
    /// Rate of fire.
    FireRate,
}

impl LevelStat {
    /// Every level stat in declaration order.
    pub const ALL: [Self; 4] = [Self::Damage, Self::Health, Self::Speed, Self::FireRate];
}

/// Partial record of stat modifiers carried by a power-up.
///
/// Absent fields are neutral: multipliers default to `1.0`, regeneration to
/// `0.0` and the shield to `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectPayload {
    /// Multiplier applied to outgoing damage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_multiplier: Option<f64>,
    /// Multiplier applied to movement speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
    /// Multiplier applied to the rate of fire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_rate_multiplier: Option<f64>,
    /// Whether the effect grants a single-use shield.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_shield: Option<bool>,
    /// Additional health regenerated per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_regen_boost: Option<f64>,
}

impl EffectPayload {
    /// Payload without any modifiers.
    pub const NONE: Self = Self {
        damage_multiplier: None,
        speed_multiplier: None,
        fire_rate_multiplier: None,
        has_shield: None,
        health_regen_boost: None,
    };

    /// Returns a copy with the damage multiplier set.
    #[must_use]
    pub const fn with_damage_multiplier(mut self, multiplier: f64) -> Self {
        self.damage_multiplier = Some(multiplier);
        self
    }

    /// Returns a copy with the speed multiplier set.
    #[must_use]
    pub const fn with_speed_multiplier(mut self, multiplier: f64) -> Self {
        self.speed_multiplier = Some(multiplier);
        self
    }

    /// Returns a copy with the fire rate multiplier set.
    #[must_use]
    pub const fn with_fire_rate_multiplier(mut self, multiplier: f64) -> Self {
        self.fire_rate_multiplier = Some(multiplier);
        self
    }

    /// Returns a copy that grants a shield.
    #[must_use]
    pub const fn with_shield(mut self) -> Self {
        self.has_shield = Some(true);
        self
    }

    /// Returns a copy with the regeneration boost set.
    #[must_use]
    pub const fn with_health_regen_boost(mut self, boost: f64) -> Self {
        self.health_regen_boost = Some(boost);
        self
    }

    /// Damage multiplier, `1.0` when absent.
    #[must_use]
    pub fn damage(&self) -> f64 {
        self.damage_multiplier.unwrap_or(1.0)
    }

    /// Speed multiplier, `1.0` when absent.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed_multiplier.unwrap_or(1.0)
    }

    /// Fire rate multiplier, `1.0` when absent.
    #[must_use]
    pub fn fire_rate(&self) -> f64 {
        self.fire_rate_multiplier.unwrap_or(1.0)
    }

    /// Regeneration boost, `0.0` when absent.
    #[must_use]
    pub fn health_regen(&self) -> f64 {
        self.health_regen_boost.unwrap_or(0.0)
    }

    /// Whether the payload grants a shield.
    #[must_use]
    pub fn grants_shield(&self) -> bool {
        self.has_shield.unwrap_or(false)
    }

    /// Reports whether this payload should replace `other` when the same
    /// power-up is collected again.
    ///
    /// A single strictly greater numeric modifier wins the whole payload.
    /// Fields are never merged individually.
    #[must_use]
    pub fn is_stronger_than(&self, other: &Self) -> bool {
        self.damage() > other.damage()
            || self.speed() > other.speed()
            || self.fire_rate() > other.fire_rate()
            || self.health_regen() > other.health_regen()
    }
}

/// Aggregate modifiers derived from every active power-up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectTotals {
    /// Product of all damage multipliers.
    pub damage_multiplier: f64,
    /// Product of all speed multipliers.
    pub speed_multiplier: f64,
    /// Product of all fire rate multipliers.
    pub fire_rate_multiplier: f64,
    /// Whether any active effect grants a shield.
    pub has_shield: bool,
    /// Sum of all regeneration boosts.
    pub health_regen_boost: f64,
}

impl EffectTotals {
    /// Totals with no active effects.
    pub const NEUTRAL: Self = Self {
        damage_multiplier: 1.0,
        speed_multiplier: 1.0,
        fire_rate_multiplier: 1.0,
        has_shield: false,
        health_regen_boost: 0.0,
    };

    /// Recomputes totals from scratch over the provided payloads.
    #[must_use]
    pub fn from_payloads<'a, I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = &'a EffectPayload>,
    {
        payloads
            .into_iter()
            .fold(Self::NEUTRAL, |mut totals, payload| {
                totals.damage_multiplier *= payload.damage();
                totals.speed_multiplier *= payload.speed();
                totals.fire_rate_multiplier *= payload.fire_rate();
                totals.has_shield |= payload.grants_shield();
                totals.health_regen_boost += payload.health_regen();
                totals
            })
    }
}

impl Default for EffectTotals {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Result of routing an incoming hit through the power-up shield.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageMitigation {
    /// Damage that reaches the player.
    pub actual_damage: f64,
    /// Whether a shield absorbed the hit.
    pub shield_blocked: bool,
}

impl DamageMitigation {
    /// Damage passed through unchanged.
    #[must_use]
    pub const fn passthrough(damage: f64) -> Self {
        Self {
            actual_damage: damage,
            shield_blocked: false,
        }
    }

    /// Damage fully absorbed by a shield.
    #[must_use]
    pub const fn blocked() -> Self {
        Self {
            actual_damage: 0.0,
            shield_blocked: true,
        }
    }
}

/// Point in time measured in whole milliseconds on a registry clock.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Origin of the simulation clock.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds represented by the timestamp.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp `duration` later, saturating at the maximum.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration_millis(duration)))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Selects the time base used to expire power-ups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// Time advances only through explicit ticks, so pausing freezes expiry.
    #[default]
    Simulation,
    /// Time follows the system clock and keeps running while paused.
    WallClock,
}

impl ClockSource {
    /// Reads the system clock as a timestamp since the UNIX epoch.
    #[must_use]
    pub fn wall_clock_now() -> Timestamp {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Timestamp::from_millis(duration_millis(elapsed))
    }
}

/// Reasons an upgrade purchase may be rejected.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PurchaseError {
    /// The upgrade already sits at its catalog maximum.
    #[error("upgrade is already at its maximum level of {max_level}")]
    MaxLevel {
        /// Maximum level defined by the catalog.
        max_level: u32,
    },
    /// The player cannot afford the requested levels.
    #[error("upgrade requires {required} points but only {available} are available")]
    InsufficientPoints {
        /// Points required by the purchase.
        required: u32,
        /// Points the player currently holds.
        available: u32,
    },
    /// A bulk purchase asked for zero levels.
    #[error("no upgrade levels were requested")]
    NothingToPurchase,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Awards experience, typically for defeating an enemy.
    AwardExperience {
        /// Experience to award.
        amount: f64,
    },
    /// Spends one upgrade point, optionally attributed to an upgrade kind.
    SpendUpgradePoint {
        /// Upgrade kind the point is recorded against.
        kind: Option<UpgradeKind>,
    },
    /// Purchases a single level of an upgrade.
    PurchaseUpgrade {
        /// Upgrade to purchase.
        kind: UpgradeKind,
    },
    /// Purchases several levels of an upgrade as one all-or-nothing transaction.
    PurchaseUpgradeLevels {
        /// Upgrade to purchase.
        kind: UpgradeKind,
        /// Number of levels requested.
        levels: u32,
    },
    /// Collects a power-up using its catalog duration and payload.
    CollectPowerUp {
        /// Power-up that was picked up.
        kind: PowerUpKind,
    },
    /// Activates a power-up with an explicit duration and payload.
    ActivatePowerUp {
        /// Power-up to activate.
        kind: PowerUpKind,
        /// How long the effect lasts.
        duration: Duration,
        /// Modifiers carried by the effect.
        effects: EffectPayload,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Routes an incoming hit through the shield.
    ReceiveDamage {
        /// Raw incoming damage.
        amount: f64,
    },
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Experience was added toward the next level.
    ExperienceGained {
        /// Experience that was added.
        amount: f64,
    },
    /// Experience arrived while already at the maximum level and was dropped.
    ExperienceDiscarded {
        /// Experience that was dropped.
        amount: f64,
    },
    /// Experience was negative or not finite and was ignored.
    ExperienceRejected {
        /// Offending amount.
        amount: f64,
    },
    /// The player reached a new level.
    LevelGained {
        /// Level that was reached.
        level: u32,
        /// Upgrade points granted for reaching it.
        points_granted: u32,
        /// Whether the level is a milestone.
        milestone: bool,
    },
    /// The player reached the maximum level.
    MaxLevelReached {
        /// The maximum level.
        level: u32,
    },
    /// An upgrade point was spent.
    UpgradePointSpent {
        /// Upgrade kind the point was recorded against.
        kind: Option<UpgradeKind>,
        /// Points still available afterwards.
        remaining: u32,
    },
    /// An upgrade point spend failed because none were available.
    UpgradePointSpendRejected,
    /// Upgrade levels were purchased.
    UpgradePurchased {
        /// Upgrade that was purchased.
        kind: UpgradeKind,
        /// Level of the upgrade after the purchase.
        level: u32,
        /// Points deducted.
        cost: u32,
    },
    /// An upgrade purchase was rejected.
    UpgradePurchaseRejected {
        /// Upgrade that was requested.
        kind: UpgradeKind,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// A power-up became active.
    PowerUpActivated {
        /// Power-up that was activated.
        kind: PowerUpKind,
        /// Time at which the effect expires.
        expires_at: Timestamp,
    },
    /// An already active power-up was collected again.
    PowerUpRefreshed {
        /// Power-up that was refreshed.
        kind: PowerUpKind,
        /// Expiry after the refresh.
        expires_at: Timestamp,
        /// Whether the stronger incoming payload replaced the active one.
        payload_replaced: bool,
    },
    /// A power-up ran out.
    PowerUpExpired {
        /// Power-up that expired.
        kind: PowerUpKind,
    },
    /// A shield absorbed an incoming hit and was consumed.
    ShieldAbsorbed {
        /// Damage that was absorbed.
        blocked: f64,
    },
    /// Damage reached the player.
    DamageTaken {
        /// Damage that was applied.
        amount: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        ClosedKind, EffectPayload, EffectTotals, PowerUpKind, PowerUpTable, PurchaseError,
        Timestamp, UpgradeKind, UpgradeTable,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn variant_lists_match_slots() {
        for (position, kind) in UpgradeKind::VARIANTS.iter().enumerate() {
            assert_eq!(kind.slot(), position);
        }
        for (position, kind) in PowerUpKind::VARIANTS.iter().enumerate() {
            assert_eq!(kind.slot(), position);
        }
    }

    #[test]
    fn upgrade_table_round_trips_through_bincode() {
        let table = UpgradeTable::from_fn(|kind| kind.slot() as u32 * 3);
        assert_round_trip(&table);
    }

    #[test]
    fn purchase_error_round_trips_through_bincode() {
        assert_round_trip(&PurchaseError::InsufficientPoints {
            required: 2,
            available: 1,
        });
    }

    #[test]
    fn timestamp_round_trips_through_bincode() {
        assert_round_trip(&Timestamp::from_millis(5_000));
    }

    #[test]
    fn table_serializes_as_named_map() {
        let mut table = PowerUpTable::<u32>::default();
        table.set(PowerUpKind::SpeedBoost, 2);
        let json = serde_json::to_value(&table).expect("serialize");
        assert_eq!(json["SPEED_BOOST"], 2);
        assert_eq!(json["SHIELD"], 0);
    }

    #[test]
    fn table_fills_missing_kinds_with_defaults() {
        let table: UpgradeTable<i64> =
            serde_json::from_str(r#"{"FIRE_RATE": 4}"#).expect("deserialize");
        assert_eq!(*table.get(UpgradeKind::FireRate), 4);
        assert_eq!(*table.get(UpgradeKind::Damage), 0);
    }

    #[test]
    fn table_rejects_unknown_kinds() {
        let result: Result<UpgradeTable<i64>, _> = serde_json::from_str(r#"{"ARMOR": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn stronger_payload_needs_one_strictly_greater_modifier() {
        let weak = EffectPayload::NONE.with_speed_multiplier(1.2);
        let strong = EffectPayload::NONE.with_speed_multiplier(1.5);
        assert!(strong.is_stronger_than(&weak));
        assert!(!weak.is_stronger_than(&strong));
        assert!(!strong.is_stronger_than(&strong));

        let regen = EffectPayload::NONE.with_health_regen_boost(1.0);
        assert!(regen.is_stronger_than(&strong));
    }

    #[test]
    fn shield_alone_is_not_stronger() {
        let shield = EffectPayload::NONE.with_shield();
        assert!(!shield.is_stronger_than(&EffectPayload::NONE));
    }

    #[test]
    fn totals_multiply_or_and_sum() {
        let payloads = [
            EffectPayload::NONE.with_damage_multiplier(2.0),
            EffectPayload::NONE
                .with_damage_multiplier(1.5)
                .with_health_regen_boost(2.0),
            EffectPayload::NONE.with_shield().with_health_regen_boost(0.5),
        ];
        let totals = EffectTotals::from_payloads(payloads.iter());
        assert!((totals.damage_multiplier - 3.0).abs() < f64::EPSILON);
        assert!((totals.speed_multiplier - 1.0).abs() < f64::EPSILON);
        assert!(totals.has_shield);
        assert!((totals.health_regen_boost - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_totals_are_neutral() {
        let totals = EffectTotals::from_payloads(std::iter::empty());
        assert_eq!(totals, EffectTotals::NEUTRAL);
    }

    #[test]
    fn timestamp_arithmetic_saturates() {
        let start = Timestamp::from_millis(u64::MAX - 1);
        assert_eq!(
            start.saturating_add(Duration::from_secs(1)),
            Timestamp::from_millis(u64::MAX)
        );
        assert_eq!(
            Timestamp::ZERO.saturating_duration_since(Timestamp::from_millis(10)),
            Duration::ZERO
        );
    }

    #[test]
    fn payload_omits_absent_fields() {
        let json = serde_json::to_string(&EffectPayload::NONE.with_speed_multiplier(1.5))
            .expect("serialize");
        assert_eq!(json, r#"{"speedMultiplier":1.5}"#);
    }
}
