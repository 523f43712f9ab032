use std::time::Duration;

use rampart_core::{Command, Event, PowerUpKind, UpgradeKind};
use rampart_session::{self as session, query, snapshot, GameSession};

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first.events, second.events, "replay diverged between runs");
    assert_eq!(first.snapshot, second.snapshot);
}

#[test]
fn pausing_freezes_power_up_countdown() {
    let mut session = GameSession::default();
    let mut events = Vec::new();
    session::apply(
        &mut session,
        Command::CollectPowerUp {
            kind: PowerUpKind::RapidFire,
        },
        &mut events,
    );

    for _ in 0..100 {
        session::apply(&mut session, Command::Tick { dt: Duration::ZERO }, &mut events);
    }

    assert!(query::power_ups(&session).is_active(PowerUpKind::RapidFire));
    assert_eq!(
        query::power_ups(&session).remaining(PowerUpKind::RapidFire),
        Some(Duration::from_secs(8))
    );
}

#[test]
fn replay_reaches_expected_progression() {
    let outcome = replay(scripted_commands());
    let progression = &outcome.snapshot.progression;

    assert_eq!(progression.level, 5);
    assert_eq!(progression.total_upgrade_points_earned, 4);
    assert_eq!(*outcome.snapshot.upgrades.levels.get(UpgradeKind::Damage), 2);
    assert_eq!(*outcome.snapshot.upgrades.levels.get(UpgradeKind::Speed), 1);
    assert_eq!(progression.available_upgrade_points, 1);
    assert!(outcome.snapshot.power_ups.active_power_ups.is_empty());
    assert_eq!(outcome.snapshot.power_ups.power_ups_collected, 2);
}

struct Outcome {
    events: Vec<Event>,
    snapshot: snapshot::SessionSnapshot,
}

fn replay(commands: Vec<Command>) -> Outcome {
    let mut session = GameSession::default();
    let mut events = Vec::new();
    for command in commands {
        session::apply(&mut session, command, &mut events);
    }
    Outcome {
        events,
        snapshot: snapshot::capture(&session),
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for _ in 0..24 {
        commands.push(Command::AwardExperience { amount: 25.0 });
        commands.push(Command::Tick {
            dt: Duration::from_millis(500),
        });
    }
    commands.push(Command::CollectPowerUp {
        kind: PowerUpKind::DamageBoost,
    });
    commands.push(Command::PurchaseUpgradeLevels {
        kind: UpgradeKind::Damage,
        levels: 2,
    });
    commands.push(Command::PurchaseUpgrade {
        kind: UpgradeKind::Speed,
    });
    commands.push(Command::CollectPowerUp {
        kind: PowerUpKind::Shield,
    });
    commands.push(Command::ReceiveDamage { amount: 12.0 });
    for _ in 0..30 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(500),
        });
    }
    commands
}
