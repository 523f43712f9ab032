//! Persisted state of the progression systems.
//!
//! Snapshots are what the persistence layer stores verbatim. Every integer
//! field is signed on the wire, including timestamps, so corrupted saves still
//! decode and can be clamped by the owning system on import.

use serde::{Deserialize, Serialize};

use crate::{EffectPayload, PowerUpKind, PowerUpTable, UpgradeTable};

/// Clamps a wire counter to the unsigned range kept by the systems.
#[must_use]
pub fn clamp_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Converts an unsigned counter to its wire form, saturating at `i64::MAX`.
#[must_use]
pub fn wire_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Persisted level and experience state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionSnapshot {
    /// Current level.
    pub level: i64,
    /// Experience accumulated toward the next level.
    pub experience: f64,
    /// Experience accumulated over the whole run.
    pub total_experience: f64,
    /// Unspent upgrade points.
    pub available_upgrade_points: i64,
    /// Upgrade points earned over the whole run.
    pub total_upgrade_points_earned: i64,
    /// Points historically spent per upgrade kind.
    pub upgrade_distribution: UpgradeTable<i64>,
}

/// Persisted purchased level per upgrade kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeLedgerSnapshot {
    /// Purchased level per upgrade kind.
    pub levels: UpgradeTable<i64>,
}

/// Persisted power-up registry state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerUpSnapshot {
    /// Effects active when the snapshot was captured.
    pub active_power_ups: Vec<ActivePowerUpSnapshot>,
    /// Number of power-ups collected.
    pub power_ups_collected: i64,
    /// Sum of all collected durations in milliseconds.
    pub total_power_up_duration: i64,
    /// Pickups per power-up kind.
    pub power_up_type_stats: PowerUpTable<i64>,
    /// Simulation clock reading in milliseconds when the snapshot was captured.
    pub clock: i64,
}

/// Persisted active power-up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePowerUpSnapshot {
    /// Power-up kind.
    pub kind: PowerUpKind,
    /// Registry clock reading in milliseconds at which the effect expires.
    pub expires_at: i64,
    /// Modifiers carried by the effect.
    #[serde(default)]
    pub effects: EffectPayload,
}
