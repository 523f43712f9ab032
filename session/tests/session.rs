use std::time::Duration;

use rampart_core::{
    Command, EffectPayload, Event, PowerUpKind, ProgressionConfig, PurchaseError, UpgradeKind,
};
use rampart_session::{
    self as session, query,
    snapshot::{self, SessionSnapshot},
    GameSession,
};

fn run(session: &mut GameSession, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        session::apply(session, command, &mut events);
    }
    events
}

#[test]
fn first_hundred_experience_reaches_level_two() {
    let mut session = GameSession::default();
    let events = run(
        &mut session,
        vec![Command::AwardExperience { amount: 100.0 }],
    );

    let progression = query::progression(&session);
    assert_eq!(progression.level(), 2);
    assert_eq!(progression.experience(), 0.0);
    assert_eq!(progression.available_points(), 1);
    assert!(events.contains(&Event::LevelGained {
        level: 2,
        points_granted: 1,
        milestone: false,
    }));
}

#[test]
fn purchases_spend_earned_points() {
    let mut session = GameSession::default();
    let events = run(
        &mut session,
        vec![
            Command::AwardExperience { amount: 300.0 },
            Command::PurchaseUpgrade {
                kind: UpgradeKind::Damage,
            },
            Command::PurchaseUpgrade {
                kind: UpgradeKind::Regeneration,
            },
            Command::PurchaseUpgrade {
                kind: UpgradeKind::Speed,
            },
            Command::PurchaseUpgrade {
                kind: UpgradeKind::Speed,
            },
        ],
    );

    assert!(events.contains(&Event::UpgradePurchased {
        kind: UpgradeKind::Damage,
        level: 1,
        cost: 1,
    }));
    assert!(events.contains(&Event::UpgradePurchaseRejected {
        kind: UpgradeKind::Regeneration,
        reason: PurchaseError::InsufficientPoints {
            required: 2,
            available: 1,
        },
    }));
    assert!(events.contains(&Event::UpgradePurchaseRejected {
        kind: UpgradeKind::Speed,
        reason: PurchaseError::InsufficientPoints {
            required: 1,
            available: 0,
        },
    }));
    assert_eq!(query::upgrades(&session).level(UpgradeKind::Speed), 1);
    assert_eq!(query::progression(&session).available_points(), 0);
}

#[test]
fn spending_points_without_kind() {
    let mut session = GameSession::default();
    let events = run(
        &mut session,
        vec![
            Command::SpendUpgradePoint { kind: None },
            Command::AwardExperience { amount: 100.0 },
            Command::SpendUpgradePoint { kind: None },
        ],
    );

    assert_eq!(events.first(), Some(&Event::UpgradePointSpendRejected));
    assert_eq!(
        events.last(),
        Some(&Event::UpgradePointSpent {
            kind: None,
            remaining: 0,
        })
    );
}

#[test]
fn collected_power_ups_use_catalog_defaults_and_expire_on_ticks() {
    let mut session = GameSession::default();
    let events = run(
        &mut session,
        vec![
            Command::CollectPowerUp {
                kind: PowerUpKind::SpeedBoost,
            },
            Command::Tick {
                dt: Duration::from_secs(7),
            },
        ],
    );
    assert!(events.contains(&Event::PowerUpActivated {
        kind: PowerUpKind::SpeedBoost,
        expires_at: rampart_core::Timestamp::from_millis(8_000),
    }));
    assert_eq!(query::combat_modifiers(&session).speed, 1.5);

    let events = run(
        &mut session,
        vec![Command::Tick {
            dt: Duration::from_secs(1),
        }],
    );
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced {
                dt: Duration::from_secs(1),
            },
            Event::PowerUpExpired {
                kind: PowerUpKind::SpeedBoost,
            },
        ]
    );
    assert_eq!(query::combat_modifiers(&session).speed, 1.0);
    assert_eq!(query::tick_index(&session), 2);
}

#[test]
fn shield_absorbs_one_hit_then_damage_lands() {
    let mut session = GameSession::default();
    let events = run(
        &mut session,
        vec![
            Command::CollectPowerUp {
                kind: PowerUpKind::Shield,
            },
            Command::ReceiveDamage { amount: 10.0 },
            Command::ReceiveDamage { amount: 10.0 },
        ],
    );

    let tail = &events[events.len() - 2..];
    assert_eq!(
        tail,
        [
            Event::ShieldAbsorbed { blocked: 10.0 },
            Event::DamageTaken { amount: 10.0 },
        ]
    );
}

#[test]
fn combat_modifiers_compose_all_sources() {
    let mut session = GameSession::default();
    let _ = run(
        &mut session,
        vec![
            Command::AwardExperience { amount: 100.0 },
            Command::PurchaseUpgrade {
                kind: UpgradeKind::Damage,
            },
            Command::ActivatePowerUp {
                kind: PowerUpKind::DamageBoost,
                duration: Duration::from_secs(5),
                effects: EffectPayload::NONE.with_damage_multiplier(2.0),
            },
        ],
    );

    let modifiers = query::combat_modifiers(&session);
    let expected = 1.1 * 2.0 * (1.0 + query::config(&session).level_bonus.damage);
    assert!((modifiers.damage - expected).abs() < 1e-12);
    assert_eq!(modifiers.health_regen_boost, 0.0);
    assert!(!modifiers.has_shield);
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = ProgressionConfig::default();
    config.leveling.base_experience = 0.0;
    assert!(GameSession::new(config).is_err());
}

#[test]
fn snapshot_round_trip_reproduces_state() {
    let mut session = GameSession::default();
    let _ = run(
        &mut session,
        vec![
            Command::AwardExperience { amount: 1_234.5 },
            Command::PurchaseUpgradeLevels {
                kind: UpgradeKind::FireRate,
                levels: 3,
            },
            Command::CollectPowerUp {
                kind: PowerUpKind::HealthRegen,
            },
            Command::Tick {
                dt: Duration::from_millis(2_500),
            },
        ],
    );

    let captured = snapshot::capture(&session);
    let code = captured.to_transfer_code().expect("encode");
    let json = captured.to_json().expect("encode");

    for encoded in [code, json] {
        let decoded = SessionSnapshot::decode(&encoded).expect("decode");
        let mut restored = GameSession::default();
        snapshot::restore(&mut restored, &decoded);
        assert_eq!(snapshot::capture(&restored), captured);
        assert_eq!(
            query::combat_modifiers(&restored),
            query::combat_modifiers(&session)
        );
    }
}

#[test]
fn corrupted_snapshot_is_normalized_on_restore() {
    let decoded = SessionSnapshot::from_json(
        r#"{
            "progression": {
                "level": 0,
                "experience": -20,
                "availableUpgradePoints": 6,
                "totalUpgradePointsEarned": 2
            },
            "upgrades": {"DAMAGE": 400},
            "powerUps": {"powerUpsCollected": 3}
        }"#,
    )
    .expect("decode");

    let mut session = GameSession::default();
    snapshot::restore(&mut session, &decoded);

    let progression = query::progression(&session);
    assert_eq!(progression.level(), 1);
    assert_eq!(progression.experience(), 0.0);
    assert_eq!(progression.total_points_earned(), 6);
    assert_eq!(query::upgrades(&session).level(UpgradeKind::Damage), 10);
    assert_eq!(query::power_ups(&session).collected(), 3);
}

#[test]
fn negative_statistics_in_saves_load_and_clamp() {
    let decoded = SessionSnapshot::from_json(
        r#"{
            "progression": {"level": 3, "upgradeDistribution": {"DAMAGE": -1}},
            "powerUps": {
                "powerUpsCollected": -2,
                "powerUpTypeStats": {"SPEED_BOOST": -4},
                "activePowerUps": [{"kind": "SHIELD", "expiresAt": -1, "effects": {"hasShield": true}}]
            }
        }"#,
    )
    .expect("decode");

    let mut session = GameSession::default();
    snapshot::restore(&mut session, &decoded);

    let progression = query::progression(&session);
    assert_eq!(progression.level(), 3);
    assert_eq!(*progression.distribution().get(UpgradeKind::Damage), 0);
    let power_ups = query::power_ups(&session);
    assert_eq!(power_ups.collected(), 0);
    assert_eq!(power_ups.usage(PowerUpKind::SpeedBoost), 0);

    let events = run(&mut session, vec![Command::Tick { dt: Duration::ZERO }]);
    assert!(events.contains(&Event::PowerUpExpired {
        kind: PowerUpKind::Shield,
    }));
}
