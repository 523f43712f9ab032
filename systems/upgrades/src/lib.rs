#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Permanent upgrades bought with points earned by leveling.
//!
//! The ledger records the purchased level of every upgrade kind and derives
//! linear stat multipliers from the catalog. It never owns the player's
//! points: purchases are charged against a borrowed
//! [`LevelProgressionTracker`].

use rampart_core::{
    PurchaseError, UpgradeCatalog, UpgradeKind, UpgradeLedgerSnapshot, UpgradeTable,
};
use rampart_system_leveling::LevelProgressionTracker;
use tracing::{debug, warn};

/// Purchased upgrade levels for one player.
#[derive(Clone, Debug)]
pub struct UpgradeLedger {
    catalog: UpgradeCatalog,
    levels: UpgradeTable<u32>,
}

impl UpgradeLedger {
    /// Creates a ledger with every upgrade at level 0.
    #[must_use]
    pub fn new(catalog: UpgradeCatalog) -> Self {
        Self {
            catalog,
            levels: UpgradeTable::default(),
        }
    }

    /// Buys one level of `kind`, returning `true` on success.
    pub fn purchase_upgrade(
        &mut self,
        kind: UpgradeKind,
        tracker: &mut LevelProgressionTracker,
    ) -> bool {
        self.try_purchase(kind, tracker).is_ok()
    }

    /// Buys one level of `kind` and returns the new level.
    pub fn try_purchase(
        &mut self,
        kind: UpgradeKind,
        tracker: &mut LevelProgressionTracker,
    ) -> Result<u32, PurchaseError> {
        self.try_purchase_levels(kind, 1, tracker)
    }

    /// Buys `levels` levels of `kind` as a single transaction.
    ///
    /// The total cost is checked before anything is deducted and is then
    /// charged in one step, so a rejected purchase leaves both the ledger
    /// and the tracker untouched.
    pub fn try_purchase_levels(
        &mut self,
        kind: UpgradeKind,
        levels: u32,
        tracker: &mut LevelProgressionTracker,
    ) -> Result<u32, PurchaseError> {
        if levels == 0 {
            return Err(PurchaseError::NothingToPurchase);
        }

        let definition = *self.catalog.definition(kind);
        let current = self.level(kind);
        if current.saturating_add(levels) > definition.max_level {
            return Err(PurchaseError::MaxLevel {
                max_level: definition.max_level,
            });
        }

        let required = definition.cost_per_level.saturating_mul(levels);
        let available = tracker.available_points();
        if available < required || !tracker.spend_upgrade_points(required, Some(kind)) {
            return Err(PurchaseError::InsufficientPoints {
                required,
                available,
            });
        }

        let level = current + levels;
        self.levels.set(kind, level);
        debug!(?kind, level, cost = required, "upgrade purchased");
        Ok(level)
    }

    /// Whether one more level of `kind` is both available and affordable.
    #[must_use]
    pub fn can_purchase(&self, kind: UpgradeKind, tracker: &LevelProgressionTracker) -> bool {
        self.next_level_cost(kind)
            .is_some_and(|cost| tracker.available_points() >= cost)
    }

    /// Cost of the next level of `kind`, `None` once the maximum is reached.
    #[must_use]
    pub fn next_level_cost(&self, kind: UpgradeKind) -> Option<u32> {
        let definition = self.catalog.definition(kind);
        (self.level(kind) < definition.max_level).then_some(definition.cost_per_level)
    }

    /// Purchased level of `kind`.
    #[must_use]
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        *self.levels.get(kind)
    }

    /// Catalog maximum for `kind`.
    #[must_use]
    pub const fn max_level(&self, kind: UpgradeKind) -> u32 {
        self.catalog.definition(kind).max_level
    }

    /// Linear multiplier `1 + level * bonus_per_level` for `kind`.
    #[must_use]
    pub fn multiplier(&self, kind: UpgradeKind) -> f64 {
        let bonus = self.catalog.definition(kind).bonus_per_level;
        1.0 + f64::from(self.level(kind)) * bonus
    }

    /// Damage multiplier.
    #[must_use]
    pub fn damage_multiplier(&self) -> f64 {
        self.multiplier(UpgradeKind::Damage)
    }

    /// Movement speed multiplier.
    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        self.multiplier(UpgradeKind::Speed)
    }

    /// Fire rate multiplier.
    #[must_use]
    pub fn fire_rate_multiplier(&self) -> f64 {
        self.multiplier(UpgradeKind::FireRate)
    }

    /// Maximum health multiplier.
    #[must_use]
    pub fn health_multiplier(&self) -> f64 {
        self.multiplier(UpgradeKind::Health)
    }

    /// Regeneration multiplier.
    #[must_use]
    pub fn regeneration_multiplier(&self) -> f64 {
        self.multiplier(UpgradeKind::Regeneration)
    }

    /// Points spent across all upgrades, recomputed from the current levels.
    #[must_use]
    pub fn total_points_spent(&self) -> u32 {
        self.levels
            .iter()
            .map(|(kind, level)| {
                level.saturating_mul(self.catalog.definition(kind).cost_per_level)
            })
            .fold(0, u32::saturating_add)
    }

    /// Catalog the ledger prices purchases with.
    #[must_use]
    pub const fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    /// Captures the persisted state.
    #[must_use]
    pub fn state(&self) -> UpgradeLedgerSnapshot {
        UpgradeLedgerSnapshot {
            levels: UpgradeTable::from_fn(|kind| i64::from(self.level(kind))),
        }
    }

    /// Restores persisted state, clamping every level to `[0, max_level]`.
    pub fn set_state(&mut self, snapshot: &UpgradeLedgerSnapshot) {
        for (kind, stored) in snapshot.levels.iter() {
            let max_level = self.max_level(kind);
            let level = u32::try_from((*stored).max(0))
                .unwrap_or(u32::MAX)
                .min(max_level);
            if i64::from(level) != *stored {
                warn!(?kind, stored, level, "clamped upgrade level from snapshot");
            }
            self.levels.set(kind, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UpgradeLedger;
    use rampart_core::{UpgradeCatalog, UpgradeKind};

    #[test]
    fn fresh_ledger_is_neutral() {
        let ledger = UpgradeLedger::new(UpgradeCatalog::default());
        for kind in UpgradeKind::ALL {
            assert_eq!(ledger.level(kind), 0);
            assert_eq!(ledger.multiplier(kind), 1.0);
        }
        assert_eq!(ledger.total_points_spent(), 0);
    }

    #[test]
    fn next_level_cost_disappears_at_max() {
        let mut ledger = UpgradeLedger::new(UpgradeCatalog::default());
        assert_eq!(ledger.next_level_cost(UpgradeKind::Regeneration), Some(2));
        ledger.levels.set(UpgradeKind::Regeneration, 5);
        assert_eq!(ledger.next_level_cost(UpgradeKind::Regeneration), None);
    }
}
