#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed power-up effects and their aggregate modifiers.
//!
//! Each power-up kind is either absent or active with an expiry. Collecting
//! an active kind again extends it and may swap in a stronger payload.
//! Effects leave the registry when they expire during [`TimedEffectRegistry::update`]
//! or, for shields, when they absorb a hit. Aggregate modifiers are always
//! rebuilt from the live set rather than patched incrementally.

use std::time::Duration;

use rampart_core::{
    clamp_count, duration_millis, wire_count, ActivePowerUpSnapshot, ClockSource,
    DamageMitigation, EffectPayload, EffectTotals, Event, PowerUpKind, PowerUpSnapshot,
    PowerUpTable, Timestamp,
};
use tracing::{debug, trace, warn};

/// Number of kinds suggested by [`TimedEffectRegistry::recommended_power_ups`].
pub const RECOMMENDATION_COUNT: usize = 3;

/// Power-up currently affecting the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePowerUp {
    /// Power-up kind.
    pub kind: PowerUpKind,
    /// Time at which the effect expires.
    pub expires_at: Timestamp,
    /// Modifiers carried by the effect.
    pub effects: EffectPayload,
}

/// Registry of active power-ups for one player.
#[derive(Clone, Debug)]
pub struct TimedEffectRegistry {
    clock: ClockSource,
    simulation_time: Timestamp,
    active: PowerUpTable<Option<ActivePowerUp>>,
    totals: EffectTotals,
    collected: u64,
    total_duration_ms: u64,
    usage: PowerUpTable<u64>,
}

impl TimedEffectRegistry {
    /// Creates an empty registry driven by `clock`.
    #[must_use]
    pub fn new(clock: ClockSource) -> Self {
        Self {
            clock,
            simulation_time: Timestamp::ZERO,
            active: PowerUpTable::default(),
            totals: EffectTotals::NEUTRAL,
            collected: 0,
            total_duration_ms: 0,
            usage: PowerUpTable::default(),
        }
    }

    /// Current reading of the registry clock.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        match self.clock {
            ClockSource::Simulation => self.simulation_time,
            ClockSource::WallClock => ClockSource::wall_clock_now(),
        }
    }

    /// Activates `kind` for `duration`, or refreshes it when already active.
    ///
    /// A refresh keeps the later of the two expiries and replaces the payload
    /// only when the incoming one is stronger. Collection statistics are
    /// updated either way. Returns the resulting expiry.
    pub fn add_power_up(
        &mut self,
        kind: PowerUpKind,
        duration: Duration,
        effects: EffectPayload,
        out: &mut Vec<Event>,
    ) -> Timestamp {
        let candidate = self.now().saturating_add(duration);
        let slot = self.active.get_mut(kind);
        let expires_at = match slot.as_mut() {
            Some(existing) => {
                existing.expires_at = existing.expires_at.max(candidate);
                let payload_replaced = effects.is_stronger_than(&existing.effects);
                if payload_replaced {
                    existing.effects = effects;
                }
                debug!(?kind, payload_replaced, "power-up refreshed");
                out.push(Event::PowerUpRefreshed {
                    kind,
                    expires_at: existing.expires_at,
                    payload_replaced,
                });
                existing.expires_at
            }
            None => {
                *slot = Some(ActivePowerUp {
                    kind,
                    expires_at: candidate,
                    effects,
                });
                debug!(?kind, expires_at = candidate.as_millis(), "power-up activated");
                out.push(Event::PowerUpActivated {
                    kind,
                    expires_at: candidate,
                });
                candidate
            }
        };

        self.collected = self.collected.saturating_add(1);
        self.total_duration_ms = self
            .total_duration_ms
            .saturating_add(duration_millis(duration));
        let used = self.usage.get_mut(kind);
        *used = used.saturating_add(1);

        self.recompute();
        expires_at
    }

    /// Advances the clock and removes every effect that has expired.
    ///
    /// Under [`ClockSource::WallClock`] the delta is ignored and the system
    /// clock decides expiry. Returns the number of effects removed.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Event>) -> usize {
        if self.clock == ClockSource::Simulation {
            self.simulation_time = self.simulation_time.saturating_add(dt);
        }

        let now = self.now();
        let mut removed = 0;
        for kind in PowerUpKind::ALL {
            let slot = self.active.get_mut(kind);
            if slot.as_ref().is_some_and(|effect| now >= effect.expires_at) {
                *slot = None;
                removed += 1;
                trace!(?kind, now = now.as_millis(), "power-up expired");
                out.push(Event::PowerUpExpired { kind });
            }
        }

        if removed > 0 {
            self.recompute();
        }
        removed
    }

    /// Routes an incoming hit through the shield.
    ///
    /// A positive hit against an active shield is fully absorbed and
    /// consumes the shield regardless of its remaining time. The dedicated
    /// [`PowerUpKind::Shield`] effect is consumed first; otherwise the
    /// earliest-expiring effect whose payload grants a shield goes. Zero,
    /// negative and NaN hits pass through without touching the shield.
    pub fn mitigate_damage(&mut self, incoming: f64) -> DamageMitigation {
        if !self.totals.has_shield || incoming.is_nan() || incoming <= 0.0 {
            return DamageMitigation::passthrough(incoming);
        }

        let consumed = if self.active.get(PowerUpKind::Shield).is_some() {
            Some(PowerUpKind::Shield)
        } else {
            self.active()
                .filter(|effect| effect.effects.grants_shield())
                .min_by_key(|effect| effect.expires_at)
                .map(|effect| effect.kind)
        };

        if let Some(kind) = consumed {
            self.active.set(kind, None);
            debug!(?kind, incoming, "shield absorbed hit");
        }
        self.recompute();
        DamageMitigation::blocked()
    }

    /// The three least collected kinds, ties broken by declaration order.
    #[must_use]
    pub fn recommended_power_ups(&self) -> Vec<PowerUpKind> {
        let mut kinds = PowerUpKind::ALL;
        kinds.sort_by_key(|kind| *self.usage.get(*kind));
        kinds.into_iter().take(RECOMMENDATION_COUNT).collect()
    }

    /// Whether `kind` is currently active.
    #[must_use]
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.get(kind).is_some()
    }

    /// Time left on `kind`, `None` when it is not active.
    #[must_use]
    pub fn remaining(&self, kind: PowerUpKind) -> Option<Duration> {
        let effect = self.active.get(kind).as_ref()?;
        Some(effect.expires_at.saturating_duration_since(self.now()))
    }

    /// Iterates over the active effects in declaration order.
    pub fn active(&self) -> impl Iterator<Item = &ActivePowerUp> + '_ {
        self.active.values().flatten()
    }

    /// Removes every active effect without touching statistics.
    pub fn clear(&mut self) {
        self.active = PowerUpTable::default();
        self.recompute();
    }

    /// Aggregate modifiers of the active effects.
    #[must_use]
    pub const fn totals(&self) -> &EffectTotals {
        &self.totals
    }

    /// Number of power-ups collected.
    #[must_use]
    pub const fn collected(&self) -> u64 {
        self.collected
    }

    /// Sum of every collected duration.
    #[must_use]
    pub const fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_duration_ms)
    }

    /// Pickups of `kind`.
    #[must_use]
    pub fn usage(&self, kind: PowerUpKind) -> u64 {
        *self.usage.get(kind)
    }

    /// Time base used for expiry.
    #[must_use]
    pub const fn clock(&self) -> ClockSource {
        self.clock
    }

    /// Captures the persisted state.
    #[must_use]
    pub fn state(&self) -> PowerUpSnapshot {
        PowerUpSnapshot {
            active_power_ups: self
                .active()
                .map(|effect| ActivePowerUpSnapshot {
                    kind: effect.kind,
                    expires_at: wire_count(effect.expires_at.as_millis()),
                    effects: effect.effects,
                })
                .collect(),
            power_ups_collected: wire_count(self.collected),
            total_power_up_duration: wire_count(self.total_duration_ms),
            power_up_type_stats: PowerUpTable::from_fn(|kind| {
                wire_count(*self.usage.get(kind))
            }),
            clock: wire_count(self.simulation_time.as_millis()),
        }
    }

    /// Restores persisted state.
    ///
    /// Negative counters and timestamps are clamped to zero, so an effect with
    /// a negative expiry leaves on the next update. Duplicate entries for one
    /// kind collapse into the one with the later expiry. Expired entries are
    /// kept and removed by the next update.
    pub fn set_state(&mut self, snapshot: &PowerUpSnapshot) {
        self.simulation_time = Timestamp::from_millis(clamp_count(snapshot.clock));
        self.active = PowerUpTable::default();
        for entry in &snapshot.active_power_ups {
            let expires_at = Timestamp::from_millis(clamp_count(entry.expires_at));
            let slot = self.active.get_mut(entry.kind);
            if slot
                .as_ref()
                .is_some_and(|existing| existing.expires_at >= expires_at)
            {
                continue;
            }
            *slot = Some(ActivePowerUp {
                kind: entry.kind,
                expires_at,
                effects: entry.effects,
            });
        }
        self.collected = clamp_count(snapshot.power_ups_collected);
        self.total_duration_ms = clamp_count(snapshot.total_power_up_duration);
        self.usage =
            PowerUpTable::from_fn(|kind| clamp_count(*snapshot.power_up_type_stats.get(kind)));

        let negative = snapshot.clock < 0
            || snapshot.power_ups_collected < 0
            || snapshot.total_power_up_duration < 0
            || snapshot.power_up_type_stats.values().any(|count| *count < 0)
            || snapshot.active_power_ups.iter().any(|entry| entry.expires_at < 0);
        if negative {
            warn!("clamped negative values in power-up snapshot");
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.totals = EffectTotals::from_payloads(self.active().map(|effect| &effect.effects));
    }
}
