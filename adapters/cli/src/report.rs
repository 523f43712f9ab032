//! Human readable summaries of a session.

use rampart_core::{PowerUpKind, UpgradeKind};
use rampart_session::{query, GameSession};

/// Prints level, upgrades, power-ups and combined modifiers.
pub(crate) fn print_session(session: &GameSession) {
    let progression = query::progression(session);
    match progression.experience_to_next_level() {
        Some(remaining) => println!(
            "level {} ({:.0}% to next, {remaining:.1} xp remaining)",
            progression.level(),
            progression.level_progress() * 100.0,
        ),
        None => println!("level {} (max)", progression.level()),
    }
    println!(
        "experience: {:.1} total, points: {} available of {} earned",
        progression.total_experience(),
        progression.available_points(),
        progression.total_points_earned(),
    );

    let upgrades = query::upgrades(session);
    println!("upgrades ({} points spent):", upgrades.total_points_spent());
    for kind in UpgradeKind::ALL {
        println!(
            "  {:<14} {:>2}/{:<2} x{:.2}",
            kind.label(),
            upgrades.level(kind),
            upgrades.max_level(kind),
            upgrades.multiplier(kind),
        );
    }

    let power_ups = query::power_ups(session);
    println!(
        "power-ups: {} collected, {:.1}s granted",
        power_ups.collected(),
        power_ups.total_duration().as_secs_f64(),
    );
    for kind in PowerUpKind::ALL {
        let remaining = power_ups
            .remaining(kind)
            .map_or_else(|| "-".to_owned(), |left| format!("{:.1}s", left.as_secs_f64()));
        println!(
            "  {:<14} used {:>3}  active {remaining}",
            kind.label(),
            power_ups.usage(kind),
        );
    }

    let modifiers = query::combat_modifiers(session);
    println!(
        "modifiers: damage x{:.2}, speed x{:.2}, fire rate x{:.2}, health x{:.2}, regen x{:.2} +{:.1}, shield {}",
        modifiers.damage,
        modifiers.speed,
        modifiers.fire_rate,
        modifiers.health,
        modifiers.regeneration,
        modifiers.health_regen_boost,
        if modifiers.has_shield { "up" } else { "down" },
    );
}
