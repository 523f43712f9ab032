#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative progression state for one player's game session.
//!
//! A [`GameSession`] owns the player's level tracker, upgrade ledger and
//! power-up registry. Adapters mutate it exclusively through [`apply`] and
//! read it through [`query`]. Saves are produced and consumed by
//! [`snapshot`].

pub mod snapshot;

use rampart_core::{Command, ConfigError, Event, ProgressionConfig, UpgradeKind};
use rampart_system_leveling::LevelProgressionTracker;
use rampart_system_power_ups::TimedEffectRegistry;
use rampart_system_upgrades::UpgradeLedger;
use tracing::debug;

/// Progression state owned by a single player.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: ProgressionConfig,
    progression: LevelProgressionTracker,
    upgrades: UpgradeLedger,
    power_ups: TimedEffectRegistry,
    tick_index: u64,
}

impl GameSession {
    /// Creates a fresh session after validating `config`.
    pub fn new(config: ProgressionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ProgressionConfig) -> Self {
        Self {
            progression: LevelProgressionTracker::new(&config.leveling, config.level_bonus),
            upgrades: UpgradeLedger::new(config.upgrades),
            power_ups: TimedEffectRegistry::new(config.power_ups.clock),
            tick_index: 0,
            config,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::from_valid(ProgressionConfig::default())
    }
}

/// Applies the provided command to the session, broadcasting what changed.
pub fn apply(session: &mut GameSession, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AwardExperience { amount } => {
            let _ = session.progression.add_experience(amount, out_events);
        }
        Command::SpendUpgradePoint { kind } => {
            if session.progression.spend_upgrade_point(kind) {
                out_events.push(Event::UpgradePointSpent {
                    kind,
                    remaining: session.progression.available_points(),
                });
            } else {
                out_events.push(Event::UpgradePointSpendRejected);
            }
        }
        Command::PurchaseUpgrade { kind } => purchase(session, kind, 1, out_events),
        Command::PurchaseUpgradeLevels { kind, levels } => {
            purchase(session, kind, levels, out_events);
        }
        Command::CollectPowerUp { kind } => {
            let definition = *session.config.power_ups.catalog.definition(kind);
            let _ = session.power_ups.add_power_up(
                kind,
                definition.duration(),
                definition.effects,
                out_events,
            );
        }
        Command::ActivatePowerUp {
            kind,
            duration,
            effects,
        } => {
            let _ = session
                .power_ups
                .add_power_up(kind, duration, effects, out_events);
        }
        Command::Tick { dt } => {
            session.tick_index = session.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            let _ = session.power_ups.update(dt, out_events);
        }
        Command::ReceiveDamage { amount } => {
            let mitigation = session.power_ups.mitigate_damage(amount);
            if mitigation.shield_blocked {
                out_events.push(Event::ShieldAbsorbed { blocked: amount });
            } else if mitigation.actual_damage > 0.0 {
                out_events.push(Event::DamageTaken {
                    amount: mitigation.actual_damage,
                });
            }
        }
    }
}

fn purchase(session: &mut GameSession, kind: UpgradeKind, levels: u32, out_events: &mut Vec<Event>) {
    match session
        .upgrades
        .try_purchase_levels(kind, levels, &mut session.progression)
    {
        Ok(level) => {
            let cost = session
                .config
                .upgrades
                .definition(kind)
                .cost_per_level
                .saturating_mul(levels);
            out_events.push(Event::UpgradePurchased { kind, level, cost });
        }
        Err(reason) => {
            debug!(?kind, %reason, "upgrade purchase rejected");
            out_events.push(Event::UpgradePurchaseRejected { kind, reason });
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use super::GameSession;
    use rampart_core::{LevelStat, ProgressionConfig};
    use rampart_system_leveling::LevelProgressionTracker;
    use rampart_system_power_ups::TimedEffectRegistry;
    use rampart_system_upgrades::UpgradeLedger;

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(session: &GameSession) -> &ProgressionConfig {
        &session.config
    }

    /// Level and experience tracker.
    #[must_use]
    pub fn progression(session: &GameSession) -> &LevelProgressionTracker {
        &session.progression
    }

    /// Purchased upgrades.
    #[must_use]
    pub fn upgrades(session: &GameSession) -> &UpgradeLedger {
        &session.upgrades
    }

    /// Active power-ups.
    #[must_use]
    pub fn power_ups(session: &GameSession) -> &TimedEffectRegistry {
        &session.power_ups
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(session: &GameSession) -> u64 {
        session.tick_index
    }

    /// Combines upgrades, active power-ups and the innate level bonus into
    /// the modifiers consumed by combat and movement.
    #[must_use]
    pub fn combat_modifiers(session: &GameSession) -> CombatModifiers {
        let upgrades = &session.upgrades;
        let totals = session.power_ups.totals();
        let innate = |stat| 1.0 + session.progression.level_bonus(stat);

        CombatModifiers {
            damage: upgrades.damage_multiplier()
                * totals.damage_multiplier
                * innate(LevelStat::Damage),
            speed: upgrades.speed_multiplier() * totals.speed_multiplier * innate(LevelStat::Speed),
            fire_rate: upgrades.fire_rate_multiplier()
                * totals.fire_rate_multiplier
                * innate(LevelStat::FireRate),
            health: upgrades.health_multiplier() * innate(LevelStat::Health),
            regeneration: upgrades.regeneration_multiplier(),
            health_regen_boost: totals.health_regen_boost,
            has_shield: totals.has_shield,
        }
    }

    /// Modifiers read by combat and movement every frame.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CombatModifiers {
        /// Outgoing damage multiplier.
        pub damage: f64,
        /// Movement speed multiplier.
        pub speed: f64,
        /// Rate of fire multiplier.
        pub fire_rate: f64,
        /// Maximum health multiplier.
        pub health: f64,
        /// Regeneration multiplier from upgrades.
        pub regeneration: f64,
        /// Flat regeneration added by power-ups.
        pub health_regen_boost: f64,
        /// Whether the next hit will be absorbed.
        pub has_shield: bool,
    }
}
