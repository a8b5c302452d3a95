//! Prestige rules.
//!
//! Prestiging moves a player to the next prestige tier: the XP curve for
//! the new tier is steeper, XP and achievements are kept, and skills are
//! rebuilt by a `SkillRetentionPolicy` (a full reset by default).

use crate::config::{PrestigeBonusConfig, PrestigeRequirement};
use crate::skill::SkillLevels;
use serde::{Deserialize, Serialize};

/// Decides which learned skills survive a prestige.
///
/// # Examples
///
/// ```rust
/// use zzlevel::prestige::{FullReset, SkillRetentionPolicy};
/// use zzlevel::skill::SkillLevels;
/// use zzlevel::{SkillId, TreeId};
///
/// let mut skills = SkillLevels::new();
/// skills.entry(TreeId::from_str("COMBAT")).or_default().insert(SkillId::from_str("STRENGTH"), 4);
///
/// assert!(FullReset.skills_after_prestige(&skills, 1).is_empty());
/// ```
pub trait SkillRetentionPolicy: Send + Sync {
    /// Skill levels the player keeps when entering `new_prestige`.
    fn skills_after_prestige(&self, old: &SkillLevels, new_prestige: u32) -> SkillLevels;

    /// Human-readable name, used in logs.
    fn description(&self) -> String;
}

/// Clears every learned skill.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullReset;

impl SkillRetentionPolicy for FullReset {
    fn skills_after_prestige(&self, _old: &SkillLevels, _new_prestige: u32) -> SkillLevels {
        SkillLevels::new()
    }

    fn description(&self) -> String {
        "full reset".to_string()
    }
}

/// Inputs to a prestige eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrestigeStanding {
    pub prestige: u32,
    pub level: u32,
    pub total_xp: u64,
    pub achievement_count: usize,
}

/// Outcome of checking whether a player may prestige.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrestigeCheck {
    /// Tier the player would move to.
    pub target_prestige: u32,
    pub eligible: bool,
    /// Every unmet requirement, empty when eligible.
    pub unmet: Vec<String>,
    /// True when the player is already at the last tier.
    pub at_max_prestige: bool,
}

impl PrestigeCheck {
    /// Evaluate `standing` against the requirement for `prestige + 1`.
    pub fn evaluate(
        standing: PrestigeStanding,
        prestige_max: u32,
        requirement: Option<&PrestigeRequirement>,
    ) -> Self {
        let target_prestige = standing.prestige.saturating_add(1);

        if standing.prestige >= prestige_max {
            return Self {
                target_prestige,
                eligible: false,
                unmet: vec![format!("already at maximum prestige {}", prestige_max)],
                at_max_prestige: true,
            };
        }

        let Some(req) = requirement else {
            return Self {
                target_prestige,
                eligible: false,
                unmet: vec![format!("no requirement configured for prestige {}", target_prestige)],
                at_max_prestige: false,
            };
        };

        let mut unmet = Vec::new();
        if standing.level < req.level {
            unmet.push(format!("level {} < required {}", standing.level, req.level));
        }
        if standing.total_xp < req.total_xp {
            unmet.push(format!(
                "total XP {} < required {}",
                standing.total_xp, req.total_xp
            ));
        }
        if standing.achievement_count < req.achievement_count {
            unmet.push(format!(
                "achievements {} < required {}",
                standing.achievement_count, req.achievement_count
            ));
        }

        Self {
            target_prestige,
            eligible: unmet.is_empty(),
            unmet,
            at_max_prestige: false,
        }
    }
}

/// Passive bonuses granted by a prestige tier. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrestigeBonuses {
    pub prestige: u32,
    pub xp_multiplier: f64,
    pub stat_point_bonus: u32,
    pub damage_bonus: f64,
}

impl PrestigeBonuses {
    pub fn for_tier(config: &PrestigeBonusConfig, prestige: u32) -> Self {
        let tier = f64::from(prestige);
        Self {
            prestige,
            xp_multiplier: 1.0 + tier * config.xp_multiplier_per_tier,
            stat_point_bonus: prestige.saturating_mul(config.stat_points_per_tier),
            damage_bonus: tier * config.damage_bonus_per_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{SkillId, TreeId};

    fn requirement() -> PrestigeRequirement {
        PrestigeRequirement {
            level: 100,
            total_xp: 10_000_000,
            achievement_count: 5,
        }
    }

    fn standing(level: u32, total_xp: u64, achievement_count: usize) -> PrestigeStanding {
        PrestigeStanding {
            prestige: 0,
            level,
            total_xp,
            achievement_count,
        }
    }

    #[test]
    fn test_eligible() {
        let check = PrestigeCheck::evaluate(standing(100, 10_000_000, 5), 10, Some(&requirement()));
        assert!(check.eligible);
        assert!(check.unmet.is_empty());
        assert_eq!(check.target_prestige, 1);
    }

    #[test]
    fn test_lists_every_unmet_requirement() {
        let check = PrestigeCheck::evaluate(standing(40, 5, 1), 10, Some(&requirement()));
        assert!(!check.eligible);
        assert_eq!(check.unmet.len(), 3);
        assert!(check.unmet[0].contains("level 40"));
        assert!(check.unmet[2].contains("achievements 1"));
    }

    #[test]
    fn test_at_max_prestige() {
        let mut at_max = standing(340, u64::MAX, 99);
        at_max.prestige = 10;
        let check = PrestigeCheck::evaluate(at_max, 10, Some(&requirement()));
        assert!(!check.eligible);
        assert!(check.at_max_prestige);
    }

    #[test]
    fn test_missing_requirement_is_not_eligible() {
        let check = PrestigeCheck::evaluate(standing(340, u64::MAX, 99), 10, None);
        assert!(!check.eligible);
        assert!(!check.at_max_prestige);
    }

    #[test]
    fn test_bonuses_scale_with_tier() {
        let config = PrestigeBonusConfig::default();
        let zero = PrestigeBonuses::for_tier(&config, 0);
        assert_eq!(zero.xp_multiplier, 1.0);
        assert_eq!(zero.stat_point_bonus, 0);

        let three = PrestigeBonuses::for_tier(&config, 3);
        assert!((three.xp_multiplier - 1.3).abs() < 1e-9);
        assert_eq!(three.stat_point_bonus, 15);
        assert!((three.damage_bonus - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_full_reset_clears_skills() {
        let mut skills = SkillLevels::new();
        skills
            .entry(TreeId::from_str("MIND"))
            .or_default()
            .insert(SkillId::from_str("FOCUS"), 7);
        assert!(FullReset.skills_after_prestige(&skills, 2).is_empty());
        assert_eq!(FullReset.description(), "full reset");
    }
}
