//! # zzlevel - Deterministic, Configuration-Driven Progression Engine
//!
//! A progression engine for RPGs that provides:
//! - **Deterministic** levels and ranks (same XP and prestige → same result)
//! - **Configuration-driven** curves, XP sources, skill trees and gates
//! - **XP as the only truth**: level and rank are always re-derived, never stored
//! - **Auditable** claims checked against recomputed values
//!
//! ## Core Concepts
//!
//! ### Derivation Pipeline
//!
//! Everything shown to a player flows from stored XP:
//!
//! ```text
//! [total_xp, prestige] → [ThresholdTable] → level → [LevelGates] → usable level
//!                                              └──→ [RankTable]  → rank
//! ```
//!
//! 1. **Curves** turn a prestige tier into cumulative XP thresholds
//! 2. **Levels** are the highest threshold the XP total reaches
//! 3. **Gates** cap the usable level until an achievement is held
//! 4. **Ranks** are named bands of levels
//!
//! ### Key Features
//!
//! - **Diminishing Returns**: Per-source XP decay that continues across calls
//! - **Skill Trees**: Prerequisite DAG with cross-tree requirements and cycle detection
//! - **Prestige**: Steeper curves per tier, pluggable skill retention
//! - **Audit Trail**: Consistency checks recorded to an append-only sink
//! - **Caching**: Threshold tables are generated once per prestige tier
//!
//! ## Example
//!
//! ```rust
//! use zzlevel::*;
//!
//! let engine = ProgressionEngine::new(EngineConfig::default()).unwrap();
//! let mut player = PlayerProgress::new();
//!
//! engine.add_raw_xp(&mut player, 1500);
//! assert_eq!(engine.level_from_xp(player.total_xp, player.prestige), 2);
//!
//! let strength = SkillKey::new("COMBAT", "STRENGTH");
//! engine.learn_skill(&mut player, &strength).unwrap();
//! assert_eq!(player.skill_level(&strength), 1);
//! assert_eq!(player.total_xp, 1500); // learning never spends XP
//! ```
//!
//! ## Modules
//!
//! - [`ids`] - Identifier types
//! - [`config`] - Engine configuration and defaults
//! - [`curve`] - XP threshold tables and their cache
//! - [`level`] - Level resolution and progress
//! - [`rank`] - Rank tiers
//! - [`xp`] - XP awards and diminishing returns
//! - [`gate`] - Achievement gates
//! - [`graph`] - Skill prerequisite graph
//! - [`skill`] - Skill trees
//! - [`prestige`] - Prestige requirements and bonuses
//! - [`audit`] - Consistency auditing
//! - [`progress`] - Player progress record
//! - [`engine`] - Main progression engine
//! - [`store`] - Persistence boundary
//! - [`error`] - Error types

pub mod audit;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod gate;
pub mod graph;
pub mod ids;
pub mod level;
pub mod prestige;
pub mod progress;
pub mod rank;
pub mod skill;
pub mod store;
pub mod xp;

// Re-export main types for convenience
pub use audit::{Auditor, AuditSink, ConsistencyAlert};
pub use config::EngineConfig;
pub use curve::{CurveGenerator, ThresholdTable};
pub use engine::{
    AchievementUnlock, PrestigeOutcome, ProgressSnapshot, ProgressionEngine, SkillLearned, XpAward,
};
pub use error::{ConfigError, ErrorKind, ProgressionError};
pub use gate::LevelGates;
pub use ids::{AchievementId, ActivitySource, SkillId, SkillKey, TreeId};
pub use level::LevelProgress;
pub use prestige::{PrestigeCheck, SkillRetentionPolicy};
pub use progress::PlayerProgress;
pub use rank::{RankTable, RankTier};
pub use store::{InMemoryStore, PlayerLocks, ProgressStore};
