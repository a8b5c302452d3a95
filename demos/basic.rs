//! Basic example: XP, levels and ranks
//!
//! This example demonstrates:
//! - Building an engine from the default configuration
//! - Awarding XP from activity sources
//! - Reading level progress and rank
//! - Learning a skill without spending XP

use zzlevel::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Create the engine (validates every configuration table)
    let engine = ProgressionEngine::new(EngineConfig::default())?;
    let mut player = PlayerProgress::new();

    println!("Awarding XP:");
    for (source, count) in [("DAILY_LOGIN", 1), ("QUEST_EASY", 5), ("MOB_COMMON", 120)] {
        let award = engine.add_xp(&mut player, &ActivitySource::from_str(source), count)?;
        println!(
            "  - {} x{}: +{} XP (level {} -> {})",
            source, count, award.xp_gained, award.old_level, award.new_level
        );
    }

    // Everything below is derived from total_xp
    let snapshot = engine.snapshot(&player);
    println!("\n=== Player ===");
    println!("Total XP: {}", snapshot.total_xp);
    println!("Level: {}", snapshot.effective_level);
    println!("Rank: {}", snapshot.rank);
    println!(
        "Progress: {}/{} XP ({}%) to level {}",
        snapshot.progress.xp_into_level,
        snapshot.progress.xp_needed_for_next,
        snapshot.progress.percent_to_next,
        snapshot.progress.next_level
    );
    if let Some((next, levels)) = engine.ranks().next_tier(snapshot.effective_level) {
        println!("Next rank: {} in {} levels", next.name, levels);
    }

    println!("\nLearning skills:");
    let strength = SkillKey::new("COMBAT", "STRENGTH");
    loop {
        match engine.learn_skill(&mut player, &strength) {
            Ok(learned) => println!("  - {} -> level {}", learned.skill, learned.new_level),
            Err(err) => {
                println!("  - stopped: {}", err);
                break;
            }
        }
    }
    println!("Total XP after learning: {}", player.total_xp);

    println!("\nLearnable now:");
    for key in engine
        .skill_trees()
        .learnable_skills(&player.skills, player.total_xp)
    {
        println!("  - {}", key);
    }

    Ok(())
}
