//! Player progress record.
//!
//! `PlayerProgress` is the stored source of truth for one player. Level,
//! rank and gate state are never stored; they are re-derived from
//! `total_xp`, `prestige` and `achievements` on every read.

use crate::ids::{AchievementId, ActivitySource, SkillKey};
use crate::skill::{skill_level, SkillLevels};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Persisted progression state of a single player.
///
/// # Examples
///
/// ```rust
/// use zzlevel::PlayerProgress;
///
/// let progress = PlayerProgress::new();
/// assert_eq!(progress.total_xp, 0);
/// assert_eq!(progress.prestige, 0);
///
/// let json = serde_json::to_string(&progress).unwrap();
/// let back: PlayerProgress = serde_json::from_str(&json).unwrap();
/// assert_eq!(back, progress);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub total_xp: u64,
    pub prestige: u32,
    #[serde(default)]
    pub achievements: BTreeSet<AchievementId>,
    #[serde(default)]
    pub skills: SkillLevels,
    /// Units earned per activity source, for diminishing returns.
    #[serde(default)]
    pub activity_counts: BTreeMap<ActivitySource, u64>,
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress with the given XP and nothing else.
    pub fn with_xp(total_xp: u64) -> Self {
        Self {
            total_xp,
            ..Self::default()
        }
    }

    pub fn has_achievement(&self, id: &AchievementId) -> bool {
        self.achievements.contains(id)
    }

    pub fn achievement_count(&self) -> usize {
        self.achievements.len()
    }

    pub fn skill_level(&self, key: &SkillKey) -> u32 {
        skill_level(&self.skills, key)
    }

    pub(crate) fn set_skill_level(&mut self, key: &SkillKey, level: u32) {
        self.skills
            .entry(key.tree.clone())
            .or_default()
            .insert(key.skill.clone(), level);
    }

    pub fn activity_count(&self, source: &ActivitySource) -> u64 {
        self.activity_counts.get(source).copied().unwrap_or(0)
    }
}
