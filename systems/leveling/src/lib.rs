#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Experience curve and level progression for a single player.
//!
//! The tracker owns the player's level, experience and upgrade points. It is
//! mutated only by awarding experience and spending points, and it can be
//! restored from a [`ProgressionSnapshot`] taken at any time.

use rampart_core::{
    Event, LevelBonusTable, LevelStat, LevelingConfig, ProgressionSnapshot, UpgradeKind,
    UpgradeTable,
};
use tracing::{debug, info, warn};

/// Experience required to leave each level below the maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceCurve {
    requirements: Vec<u64>,
    max_level: u32,
}

impl ExperienceCurve {
    /// Precomputes the requirement for every level below `config.max_level`.
    #[must_use]
    pub fn new(config: &LevelingConfig) -> Self {
        let requirements = (1..config.max_level)
            .map(|level| requirement_for(config.base_experience, config.growth, level))
            .collect();
        Self {
            requirements,
            max_level: config.max_level,
        }
    }

    /// Experience required to advance from `level` to the next one.
    ///
    /// Returns `None` for level 0 and for the maximum level, which has no
    /// successor.
    #[must_use]
    pub fn requirement(&self, level: u32) -> Option<u64> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.requirements.get(index).copied()
    }

    /// Cumulative experience needed to reach `level` from level 1.
    #[must_use]
    pub fn total_to_reach(&self, level: u32) -> u64 {
        self.iter()
            .take_while(|(from, _)| *from < level)
            .map(|(_, requirement)| requirement)
            .sum()
    }

    /// Highest reachable level.
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Iterates over `(level, requirement)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        (1..).zip(self.requirements.iter().copied())
    }
}

/// Experience needed to leave `level`: `floor(base * growth^(level - 1))`.
#[must_use]
pub fn requirement_for(base: f64, growth: f64, level: u32) -> u64 {
    let exponent = f64::from(level.saturating_sub(1));
    (base * growth.powf(exponent)).floor() as u64
}

/// Mutable level and experience state machine.
#[derive(Clone, Debug)]
pub struct LevelProgressionTracker {
    config: LevelingConfig,
    bonus: LevelBonusTable,
    curve: ExperienceCurve,
    level: u32,
    experience: f64,
    total_experience: f64,
    available_points: u32,
    total_points_earned: u32,
    distribution: UpgradeTable<u32>,
}

impl LevelProgressionTracker {
    /// Creates a tracker at level 1 with no experience or points.
    #[must_use]
    pub fn new(config: &LevelingConfig, bonus: LevelBonusTable) -> Self {
        Self {
            curve: ExperienceCurve::new(config),
            config: config.clone(),
            bonus,
            level: 1,
            experience: 0.0,
            total_experience: 0.0,
            available_points: 0,
            total_points_earned: 0,
            distribution: UpgradeTable::default(),
        }
    }

    /// Awards experience and applies every level-up it pays for.
    ///
    /// Returns `true` when at least one level was gained. Experience awarded
    /// at the maximum level is discarded, as is any surplus left over when
    /// the maximum level is reached. Negative and non-finite amounts are
    /// ignored.
    pub fn add_experience(&mut self, amount: f64, out: &mut Vec<Event>) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            warn!(amount, "ignoring invalid experience award");
            out.push(Event::ExperienceRejected { amount });
            return false;
        }

        if self.is_max_level() {
            debug!(amount, "discarding experience at max level");
            out.push(Event::ExperienceDiscarded { amount });
            return false;
        }

        self.experience += amount;
        self.total_experience += amount;
        out.push(Event::ExperienceGained { amount });

        let mut leveled_up = false;
        while let Some(required) = self.curve.requirement(self.level) {
            let required = required as f64;
            if self.experience < required {
                break;
            }

            self.experience -= required;
            self.level += 1;
            leveled_up = true;

            let points = self.config.points_for_level(self.level);
            self.available_points = self.available_points.saturating_add(points);
            self.total_points_earned = self.total_points_earned.saturating_add(points);
            let milestone = self.config.is_milestone(self.level);
            debug!(level = self.level, points, milestone, "level gained");
            out.push(Event::LevelGained {
                level: self.level,
                points_granted: points,
                milestone,
            });
        }

        if leveled_up && self.is_max_level() {
            self.experience = 0.0;
            info!(level = self.level, "max level reached");
            out.push(Event::MaxLevelReached { level: self.level });
        }

        leveled_up
    }

    /// Spends one upgrade point, recording it against `kind` when provided.
    ///
    /// Fails without side effects when no points are available.
    pub fn spend_upgrade_point(&mut self, kind: Option<UpgradeKind>) -> bool {
        self.spend_upgrade_points(1, kind)
    }

    /// Spends `count` points in one step, or none at all if fewer are available.
    pub fn spend_upgrade_points(&mut self, count: u32, kind: Option<UpgradeKind>) -> bool {
        if count == 0 {
            return true;
        }
        if self.available_points < count {
            return false;
        }

        self.available_points -= count;
        if let Some(kind) = kind {
            let spent = self.distribution.get_mut(kind);
            *spent = spent.saturating_add(count);
        }
        true
    }

    /// Innate bonus for `stat`, zero at level 1.
    #[must_use]
    pub fn level_bonus(&self, stat: LevelStat) -> f64 {
        self.bonus.per_level(stat) * f64::from(self.level - 1)
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn experience(&self) -> f64 {
        self.experience
    }

    /// Experience accumulated over the whole run.
    #[must_use]
    pub const fn total_experience(&self) -> f64 {
        self.total_experience
    }

    /// Unspent upgrade points.
    #[must_use]
    pub const fn available_points(&self) -> u32 {
        self.available_points
    }

    /// Upgrade points earned over the whole run.
    #[must_use]
    pub const fn total_points_earned(&self) -> u32 {
        self.total_points_earned
    }

    /// Points historically spent per upgrade kind.
    #[must_use]
    pub const fn distribution(&self) -> &UpgradeTable<u32> {
        &self.distribution
    }

    /// Curve used to compute level requirements.
    #[must_use]
    pub const fn curve(&self) -> &ExperienceCurve {
        &self.curve
    }

    /// Whether the player sits at the maximum level.
    #[must_use]
    pub fn is_max_level(&self) -> bool {
        self.level >= self.curve.max_level()
    }

    /// Experience still needed for the next level, `None` at the maximum.
    #[must_use]
    pub fn experience_to_next_level(&self) -> Option<f64> {
        let required = self.curve.requirement(self.level)? as f64;
        Some((required - self.experience).max(0.0))
    }

    /// Fraction of the current level completed, `1.0` at the maximum.
    #[must_use]
    pub fn level_progress(&self) -> f64 {
        match self.curve.requirement(self.level) {
            Some(0) | None => 1.0,
            Some(required) => (self.experience / required as f64).clamp(0.0, 1.0),
        }
    }

    /// Captures the persisted state.
    #[must_use]
    pub fn state(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            level: i64::from(self.level),
            experience: self.experience,
            total_experience: self.total_experience,
            available_upgrade_points: i64::from(self.available_points),
            total_upgrade_points_earned: i64::from(self.total_points_earned),
            upgrade_distribution: UpgradeTable::from_fn(|kind| {
                i64::from(*self.distribution.get(kind))
            }),
        }
    }

    /// Restores persisted state, clamping values that cannot occur in play.
    ///
    /// The level is clamped to `[1, max_level]`, experience, points and the
    /// per-kind distribution to non-negative values, and the earned total is
    /// raised to at least the available points.
    pub fn set_state(&mut self, snapshot: &ProgressionSnapshot) {
        let max_level = self.curve.max_level().max(1);
        self.level = u32::try_from(snapshot.level.clamp(1, i64::from(max_level))).unwrap_or(1);
        self.experience = if self.is_max_level() {
            0.0
        } else {
            non_negative(snapshot.experience)
        };
        self.total_experience = non_negative(snapshot.total_experience);
        self.available_points = clamp_points(snapshot.available_upgrade_points);
        self.total_points_earned =
            clamp_points(snapshot.total_upgrade_points_earned).max(self.available_points);
        self.distribution =
            UpgradeTable::from_fn(|kind| clamp_points(*snapshot.upgrade_distribution.get(kind)));

        if self.state() != *snapshot {
            warn!(
                level = self.level,
                available_points = self.available_points,
                "normalized out-of-range progression snapshot"
            );
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn clamp_points(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
