//! Season example: gates, prestige and auditing
//!
//! This example demonstrates:
//! - Achievement gates capping the usable level without withholding XP
//! - Unlocking an achievement to release the cap
//! - Checking and performing a prestige
//! - Per-player serialisation through `PlayerLocks`
//! - Recording audit checks as JSON lines

use std::io;
use zzlevel::audit::JsonLinesSink;
use zzlevel::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let engine = ProgressionEngine::new(EngineConfig::default())?;
    let store = InMemoryStore::new();
    let locks = PlayerLocks::new();
    store.insert("jinwoo", PlayerProgress::new());

    // ========================================================================
    // Gates
    // ========================================================================

    let boss = ActivitySource::from_str("BOSS");
    let raid = locks.with_player(&store, "jinwoo", |player| engine.add_xp(player, &boss, 40))?;
    println!("Boss raids: +{} XP (level {})", raid.xp_gained, raid.new_level);

    let award = locks.with_player(&store, "jinwoo", |player| {
        Ok(engine.add_raw_xp(player, 150_000))
    })?;
    println!("Season reward: +{} XP", award.xp_gained);
    println!("  raw level {}, usable level {}", award.raw_level, award.new_level);
    for gate in &award.blocking_gates {
        println!("  blocked at {} until {}", gate.level, gate.required_achievement);
    }

    let unlocks = locks.with_player(&store, "jinwoo", |player| {
        let mut unlocks = Vec::new();
        for gate in engine.gates().blocking_gates(0, award.raw_level, &player.achievements) {
            unlocks.push(engine.unlock_achievement(player, &gate.required_achievement));
        }
        Ok(unlocks)
    })?;
    for unlock in &unlocks {
        println!(
            "Unlocked {}: level {} -> {}",
            unlock.achievement, unlock.level_before, unlock.level_after
        );
    }

    // ========================================================================
    // Prestige
    // ========================================================================

    let mut veteran = PlayerProgress::with_xp(engine.thresholds(0).threshold(120).unwrap_or(0));
    for name in ["FIRST_DUNGEON", "GUILD_INITIATION", "RED_GATE_SURVIVOR"] {
        engine.unlock_achievement(&mut veteran, &AchievementId::from_str(name));
    }

    let check = engine.can_prestige(&veteran);
    println!("\nPrestige {} eligible: {}", check.target_prestige, check.eligible);
    for reason in &check.unmet {
        println!("  - {}", reason);
    }

    for name in ["DOUBLE_DUNGEON", "JOB_CHANGE"] {
        engine.unlock_achievement(&mut veteran, &AchievementId::from_str(name));
    }
    let outcome = engine.prestige(&mut veteran)?;
    println!(
        "Prestiged to {}: level {} -> {}, XP multiplier x{:.1}, +{} stat points",
        outcome.new_prestige,
        outcome.level_before,
        outcome.level_after,
        outcome.bonuses.xp_multiplier,
        outcome.bonuses.stat_point_bonus
    );

    // ========================================================================
    // Audit trail
    // ========================================================================

    println!("\nAudit trail:");
    let sink = JsonLinesSink::new(io::stdout());
    let auditor = engine.auditor().with_sink(&sink);

    let rank = engine.rank_from_xp(veteran.total_xp, veteran.prestige).name.clone();
    auditor.validate_rank_against_xp(&rank, veteran.total_xp, veteran.prestige);
    auditor.validate_rank_against_xp("Monarch", veteran.total_xp, veteran.prestige);
    auditor.audit_xp_progression(1_000, 500, 1_700);

    Ok(())
}
