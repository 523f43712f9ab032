//! Seeded playthrough used to eyeball balance changes.
//!
//! Every kill awards a random amount of experience, occasionally drops a
//! power-up from the recommended pool and sometimes lands a hit on the
//! player. Points are spent greedily on the least upgraded affordable kind.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Args;
use rampart_core::{Command, Event, ProgressionConfig, UpgradeKind};
use rampart_session::{self as session, query, snapshot, GameSession};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::info;

use crate::report;

/// Options for the `simulate` subcommand.
#[derive(Clone, Debug, Args)]
pub(crate) struct SimulateArgs {
    /// Number of kills to play.
    #[arg(long, default_value_t = 200)]
    pub(crate) kills: u32,
    /// Smallest experience reward per kill.
    #[arg(long, default_value_t = 10.0)]
    pub(crate) xp_min: f64,
    /// Largest experience reward per kill.
    #[arg(long, default_value_t = 40.0)]
    pub(crate) xp_max: f64,
    /// Probability that a kill drops a power-up.
    #[arg(long, default_value_t = 0.1)]
    pub(crate) drop_chance: f64,
    /// Probability that the player is hit between kills.
    #[arg(long, default_value_t = 0.05)]
    pub(crate) hit_chance: f64,
    /// Simulated time between kills in milliseconds.
    #[arg(long, default_value_t = 750)]
    pub(crate) frame_ms: u64,
    /// Seed for the random number generator.
    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,
    /// Writes the final snapshot as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub(crate) save: Option<PathBuf>,
}

/// Counters accumulated from the events of a simulated session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SimulationTally {
    pub(crate) levels_gained: u32,
    pub(crate) upgrades_purchased: u32,
    pub(crate) power_ups_expired: u32,
    pub(crate) hits_absorbed: u32,
    pub(crate) hits_taken: u32,
}

impl SimulationTally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelGained { .. } => self.levels_gained += 1,
                Event::UpgradePurchased { .. } => self.upgrades_purchased += 1,
                Event::PowerUpExpired { .. } => self.power_ups_expired += 1,
                Event::ShieldAbsorbed { .. } => self.hits_absorbed += 1,
                Event::DamageTaken { .. } => self.hits_taken += 1,
                _ => {}
            }
        }
    }
}

/// Runs the simulation and prints a summary of the final session.
pub(crate) fn run(config: ProgressionConfig, args: &SimulateArgs) -> Result<()> {
    let (session, tally) = play(config, args)?;

    println!(
        "{} kills: {} levels gained, {} upgrades purchased, {} power-ups expired, {} hits absorbed, {} hits taken",
        args.kills,
        tally.levels_gained,
        tally.upgrades_purchased,
        tally.power_ups_expired,
        tally.hits_absorbed,
        tally.hits_taken,
    );
    report::print_session(&session);

    if let Some(path) = &args.save {
        let json = snapshot::capture(&session).to_json()?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!(path = %path.display(), "snapshot saved");
    }
    Ok(())
}

/// Plays the seeded session without printing anything.
pub(crate) fn play(
    config: ProgressionConfig,
    args: &SimulateArgs,
) -> Result<(GameSession, SimulationTally)> {
    ensure!(
        args.xp_min.is_finite() && args.xp_max.is_finite() && args.xp_min >= 0.0,
        "experience rewards must be finite and non-negative"
    );
    ensure!(
        args.xp_min <= args.xp_max,
        "--xp-min {} exceeds --xp-max {}",
        args.xp_min,
        args.xp_max
    );
    for (name, chance) in [("drop", args.drop_chance), ("hit", args.hit_chance)] {
        ensure!(
            (0.0..=1.0).contains(&chance),
            "{name} chance must lie within 0..=1, got {chance}"
        );
    }

    let mut session = GameSession::new(config).context("invalid progression configuration")?;
    let mut rng = ChaCha20Rng::seed_from_u64(args.seed);
    let frame = Duration::from_millis(args.frame_ms);
    let mut tally = SimulationTally::default();
    let mut events = Vec::new();

    for _ in 0..args.kills {
        let amount = rng.gen_range(args.xp_min..=args.xp_max);
        session::apply(&mut session, Command::AwardExperience { amount }, &mut events);

        if rng.gen_bool(args.drop_chance) {
            let pool = query::power_ups(&session).recommended_power_ups();
            if !pool.is_empty() {
                let kind = pool[rng.gen_range(0..pool.len())];
                session::apply(&mut session, Command::CollectPowerUp { kind }, &mut events);
            }
        }

        if rng.gen_bool(args.hit_chance) {
            let amount = rng.gen_range(5.0..=20.0);
            session::apply(&mut session, Command::ReceiveDamage { amount }, &mut events);
        }

        while let Some(kind) = next_purchase(&session) {
            session::apply(&mut session, Command::PurchaseUpgrade { kind }, &mut events);
        }

        session::apply(&mut session, Command::Tick { dt: frame }, &mut events);
        tally.record(&events);
        events.clear();
    }

    Ok((session, tally))
}

fn next_purchase(session: &GameSession) -> Option<UpgradeKind> {
    let upgrades = query::upgrades(session);
    let progression = query::progression(session);
    UpgradeKind::ALL
        .into_iter()
        .filter(|kind| upgrades.can_purchase(*kind, progression))
        .min_by_key(|kind| upgrades.level(*kind))
}

#[cfg(test)]
mod tests {
    use super::{play, SimulateArgs};
    use rampart_core::ProgressionConfig;
    use rampart_session::{query, snapshot};

    fn args(seed: u64) -> SimulateArgs {
        SimulateArgs {
            kills: 150,
            xp_min: 10.0,
            xp_max: 40.0,
            drop_chance: 0.2,
            hit_chance: 0.1,
            frame_ms: 500,
            seed,
            save: None,
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let (first, first_tally) = play(ProgressionConfig::default(), &args(3)).expect("play");
        let (second, second_tally) = play(ProgressionConfig::default(), &args(3)).expect("play");

        assert_eq!(first_tally, second_tally);
        assert_eq!(snapshot::capture(&first), snapshot::capture(&second));
    }

    #[test]
    fn earned_points_are_spent_greedily() {
        let (session, tally) = play(ProgressionConfig::default(), &args(11)).expect("play");
        let progression = query::progression(&session);

        assert!(tally.levels_gained > 0);
        assert_eq!(tally.levels_gained + 1, progression.level());
        assert_eq!(
            query::upgrades(&session).total_points_spent() + progression.available_points(),
            progression.total_points_earned()
        );
    }

    #[test]
    fn inverted_reward_range_is_rejected() {
        let mut inverted = args(1);
        inverted.xp_min = 50.0;
        assert!(play(ProgressionConfig::default(), &inverted).is_err());
    }

    #[test]
    fn out_of_range_chance_is_rejected() {
        let mut invalid = args(1);
        invalid.hit_chance = 1.5;
        assert!(play(ProgressionConfig::default(), &invalid).is_err());
    }
}
