//! Static engine configuration.
//!
//! `EngineConfig` holds every table the engine reads: the level curve
//! parameters, XP sources, skill trees, achievement gates, prestige
//! requirements and rank tiers. It is loaded once (from JSON or from
//! `EngineConfig::default()`), validated when the engine is built, and
//! never mutated afterwards.

use crate::curve::checked_max_threshold;
use crate::error::ConfigError;
use crate::ids::{AchievementId, ActivitySource, SkillId, TreeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parameters of the exponential XP curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// XP cost of the first level-up (level 1 -> 2) at prestige 0.
    pub base_xp: f64,
    /// Growth exponent applied to `(level - 1)`.
    pub exponent: f64,
    /// Extra cost per prestige tier, as a fraction of the base cost.
    pub prestige_factor: f64,
    /// Highest reachable level.
    pub max_level: u32,
    /// Highest reachable prestige tier.
    pub prestige_max: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            base_xp: 1000.0,
            exponent: 1.18,
            prestige_factor: 0.1,
            max_level: 340,
            prestige_max: 10,
        }
    }
}

/// XP yield of one activity source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpSourceConfig {
    /// XP per unit before any decay.
    pub base: u64,
    /// Number of units earned at full value; `None` disables decay.
    #[serde(default)]
    pub diminishing_after: Option<u64>,
    /// Multiplicative decay per unit past `diminishing_after`.
    #[serde(default = "default_diminishing_rate")]
    pub diminishing_rate: f64,
}

fn default_diminishing_rate() -> f64 {
    1.0
}

impl XpSourceConfig {
    pub fn flat(base: u64) -> Self {
        Self {
            base,
            diminishing_after: None,
            diminishing_rate: 1.0,
        }
    }

    pub fn diminishing(base: u64, after: u64, rate: f64) -> Self {
        Self {
            base,
            diminishing_after: Some(after),
            diminishing_rate: rate,
        }
    }
}

/// Definition of one learnable skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub max_level: u32,
    /// Base cost; learning level `n + 1` requires `xp_cost * (n + 1)` total XP.
    pub xp_cost: u64,
    /// Comma-separated `skill:level` pairs; `tree.skill` addresses another tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,
}

impl SkillDefinition {
    pub fn new(max_level: u32, xp_cost: u64) -> Self {
        Self {
            max_level,
            xp_cost,
            prerequisite: None,
        }
    }

    pub fn requires(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisite = Some(prerequisite.into());
        self
    }
}

/// Requirements for advancing to a prestige tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestigeRequirement {
    /// Minimum level at the current prestige tier.
    pub level: u32,
    /// Minimum cumulative XP.
    pub total_xp: u64,
    /// Minimum number of unlocked achievements.
    pub achievement_count: usize,
}

/// Per-tier passive bonuses reported after a prestige.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestigeBonusConfig {
    pub xp_multiplier_per_tier: f64,
    pub stat_points_per_tier: u32,
    pub damage_bonus_per_tier: f64,
}

impl Default for PrestigeBonusConfig {
    fn default() -> Self {
        Self {
            xp_multiplier_per_tier: 0.1,
            stat_points_per_tier: 5,
            damage_bonus_per_tier: 0.05,
        }
    }
}

/// A named rank covering every level from `min_level` up to the next tier's floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTierConfig {
    pub name: String,
    pub min_level: u32,
}

/// The complete static configuration of a progression engine.
///
/// # Examples
///
/// ```rust
/// use zzlevel::EngineConfig;
///
/// let json = r#"{
///     "level": { "base_xp": 100.0, "exponent": 1.0, "prestige_factor": 0.5,
///                "max_level": 20, "prestige_max": 2 },
///     "rank_tiers": [ { "name": "Rookie", "min_level": 1 },
///                     { "name": "Veteran", "min_level": 10 } ]
/// }"#;
///
/// let config = EngineConfig::from_json_str(json).unwrap();
/// assert_eq!(config.level.max_level, 20);
/// assert!(config.skill_trees.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub level: LevelConfig,
    #[serde(default)]
    pub xp_sources: BTreeMap<ActivitySource, XpSourceConfig>,
    #[serde(default)]
    pub skill_trees: BTreeMap<TreeId, BTreeMap<SkillId, SkillDefinition>>,
    /// Level number -> achievement required to use that level.
    #[serde(default)]
    pub level_gates: BTreeMap<u32, AchievementId>,
    /// Target prestige tier -> requirement to reach it.
    #[serde(default)]
    pub prestige_requirements: BTreeMap<u32, PrestigeRequirement>,
    pub rank_tiers: Vec<RankTierConfig>,
    #[serde(default)]
    pub prestige_bonuses: PrestigeBonusConfig,
}

impl EngineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Serialize this configuration as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the tables that do not need the skill graph.
    ///
    /// Prerequisite expressions are validated when `SkillTrees` is built,
    /// which `ProgressionEngine::new` does right after this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_curve()?;
        self.validate_sources()?;
        self.validate_rank_tiers()?;
        self.validate_gates()?;
        self.validate_prestige()?;

        for (tree, skills) in &self.skill_trees {
            for (skill, def) in skills {
                if def.max_level == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "skill {}.{} has max_level 0",
                        tree, skill
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_curve(&self) -> Result<(), ConfigError> {
        let level = &self.level;
        if !level.base_xp.is_finite() || level.base_xp < 1.0 {
            return Err(ConfigError::InvalidCurve(format!(
                "base_xp must be at least 1, got {}",
                level.base_xp
            )));
        }
        if !level.exponent.is_finite() || level.exponent < 0.0 {
            return Err(ConfigError::InvalidCurve(format!(
                "exponent must be non-negative, got {}",
                level.exponent
            )));
        }
        if !level.prestige_factor.is_finite() || level.prestige_factor < 0.0 {
            return Err(ConfigError::InvalidCurve(format!(
                "prestige_factor must be non-negative, got {}",
                level.prestige_factor
            )));
        }
        if level.max_level == 0 {
            return Err(ConfigError::InvalidCurve("max_level must be at least 1".into()));
        }
        if checked_max_threshold(level, level.prestige_max).is_none() {
            return Err(ConfigError::InvalidCurve(format!(
                "XP threshold of level {} at prestige {} does not fit in 64 bits",
                level.max_level, level.prestige_max
            )));
        }
        Ok(())
    }

    fn validate_sources(&self) -> Result<(), ConfigError> {
        for (source, cfg) in &self.xp_sources {
            let rate = cfg.diminishing_rate;
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "XP source {} has diminishing_rate {} outside [0, 1]",
                    source, rate
                )));
            }
        }
        Ok(())
    }

    fn validate_rank_tiers(&self) -> Result<(), ConfigError> {
        let first = self
            .rank_tiers
            .first()
            .ok_or_else(|| ConfigError::InvalidRankTiers("no tiers configured".into()))?;
        if first.min_level != 1 {
            return Err(ConfigError::InvalidRankTiers(format!(
                "first tier {} must start at level 1, starts at {}",
                first.name, first.min_level
            )));
        }
        for pair in self.rank_tiers.windows(2) {
            if pair[1].min_level <= pair[0].min_level {
                return Err(ConfigError::InvalidRankTiers(format!(
                    "tier {} (level {}) does not start above {} (level {})",
                    pair[1].name, pair[1].min_level, pair[0].name, pair[0].min_level
                )));
            }
        }
        if let Some(tier) = self.rank_tiers.iter().find(|t| t.name.trim().is_empty()) {
            return Err(ConfigError::InvalidRankTiers(format!(
                "tier at level {} has an empty name",
                tier.min_level
            )));
        }
        Ok(())
    }

    fn validate_gates(&self) -> Result<(), ConfigError> {
        for level in self.level_gates.keys() {
            if *level < 2 || *level > self.level.max_level {
                return Err(ConfigError::Invalid(format!(
                    "level gate at {} outside 2..={}",
                    level, self.level.max_level
                )));
            }
        }
        Ok(())
    }

    fn validate_prestige(&self) -> Result<(), ConfigError> {
        for tier in 1..=self.level.prestige_max {
            if !self.prestige_requirements.contains_key(&tier) {
                return Err(ConfigError::Invalid(format!(
                    "missing prestige requirement for tier {}",
                    tier
                )));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            level: LevelConfig::default(),
            xp_sources: default_xp_sources(),
            skill_trees: default_skill_trees(),
            level_gates: default_level_gates(),
            prestige_requirements: default_prestige_requirements(10),
            rank_tiers: default_rank_tiers(),
            prestige_bonuses: PrestigeBonusConfig::default(),
        }
    }
}

fn default_xp_sources() -> BTreeMap<ActivitySource, XpSourceConfig> {
    [
        ("MOB_COMMON", XpSourceConfig::diminishing(10, 1000, 0.8)),
        ("MOB_ELITE", XpSourceConfig::diminishing(50, 200, 0.85)),
        ("BOSS", XpSourceConfig::diminishing(500, 20, 0.9)),
        ("QUEST_EASY", XpSourceConfig::diminishing(100, 100, 0.9)),
        ("QUEST_HARD", XpSourceConfig::diminishing(400, 50, 0.9)),
        ("DAILY_LOGIN", XpSourceConfig::flat(50)),
        ("ACHIEVEMENT", XpSourceConfig::flat(1000)),
    ]
    .into_iter()
    .map(|(name, cfg)| (ActivitySource::from_str(name), cfg))
    .collect()
}

fn default_skill_trees() -> BTreeMap<TreeId, BTreeMap<SkillId, SkillDefinition>> {
    let combat = [
        ("STRENGTH", SkillDefinition::new(10, 500)),
        (
            "CRITICAL_HIT",
            SkillDefinition::new(5, 1500).requires("STRENGTH:5"),
        ),
        (
            "BERSERK",
            SkillDefinition::new(3, 5000).requires("CRITICAL_HIT:3,ENDURANCE.VITALITY:2"),
        ),
    ];
    let endurance = [
        ("VITALITY", SkillDefinition::new(10, 400)),
        ("IRON_SKIN", SkillDefinition::new(5, 2000).requires("VITALITY:5")),
    ];
    let mind = [
        ("FOCUS", SkillDefinition::new(10, 400)),
        ("MEDITATION", SkillDefinition::new(5, 1200).requires("FOCUS:3")),
        (
            "ARCANE_INSIGHT",
            SkillDefinition::new(3, 6000).requires("MEDITATION:5,COMBAT.STRENGTH:3"),
        ),
    ];

    let tree = |skills: &[(&str, SkillDefinition)]| {
        skills
            .iter()
            .map(|(name, def)| (SkillId::from_str(name), def.clone()))
            .collect::<BTreeMap<_, _>>()
    };

    let mut trees = BTreeMap::new();
    trees.insert(TreeId::from_str("COMBAT"), tree(&combat));
    trees.insert(TreeId::from_str("ENDURANCE"), tree(&endurance));
    trees.insert(TreeId::from_str("MIND"), tree(&mind));
    trees
}

fn default_level_gates() -> BTreeMap<u32, AchievementId> {
    [
        (10, "FIRST_DUNGEON"),
        (25, "GUILD_INITIATION"),
        (50, "RED_GATE_SURVIVOR"),
        (100, "DOUBLE_DUNGEON"),
        (150, "JOB_CHANGE"),
        (200, "NATIONAL_RAID"),
        (250, "DEMON_CASTLE"),
        (300, "MONARCH_TRIAL"),
    ]
    .into_iter()
    .map(|(level, id)| (level, AchievementId::from_str(id)))
    .collect()
}

fn default_prestige_requirements(prestige_max: u32) -> BTreeMap<u32, PrestigeRequirement> {
    (1..=prestige_max)
        .map(|tier| {
            (
                tier,
                PrestigeRequirement {
                    level: 100 + (tier - 1) * 20,
                    total_xp: 10_000_000 * u64::from(tier),
                    achievement_count: 3 + 2 * tier as usize,
                },
            )
        })
        .collect()
}

fn default_rank_tiers() -> Vec<RankTierConfig> {
    const NAMES: [&str; 18] = [
        "F",
        "E",
        "D",
        "C",
        "B",
        "A",
        "S",
        "SS",
        "SSS",
        "National",
        "Special Authority",
        "Transcendent",
        "Shadow",
        "Sovereign",
        "Ruler",
        "Emperor",
        "Absolute",
        "Monarch",
    ];
    NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| RankTierConfig {
            name: (*name).to_string(),
            min_level: if idx == 0 { 1 } else { idx as u32 * 20 },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rank_tiers.len(), 18);
        assert_eq!(config.rank_tiers[0].min_level, 1);
        assert_eq!(config.rank_tiers[1].min_level, 20);
        assert_eq!(config.rank_tiers[17].name, "Monarch");
        assert_eq!(config.rank_tiers[17].min_level, 340);
    }

    #[test]
    fn test_default_mob_common_source() {
        let config = EngineConfig::default();
        let mob = &config.xp_sources[&ActivitySource::from_str("MOB_COMMON")];
        assert_eq!(mob.base, 10);
        assert_eq!(mob.diminishing_after, Some(1000));
        assert_eq!(mob.diminishing_rate, 0.8);
    }

    #[test]
    fn test_json_round_trip_preserves_config() {
        let config = EngineConfig::default();
        let json = config.to_json_pretty().unwrap();
        let back = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_source_without_decay_fields() {
        let json = r#"{
            "level": { "base_xp": 10.0, "exponent": 1.0, "prestige_factor": 0.0,
                       "max_level": 5, "prestige_max": 0 },
            "xp_sources": { "LOGIN": { "base": 25 } },
            "rank_tiers": [ { "name": "Only", "min_level": 1 } ]
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        let login = &config.xp_sources[&ActivitySource::from_str("LOGIN")];
        assert_eq!(login.diminishing_after, None);
        assert_eq!(login.diminishing_rate, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reject_non_positive_base_xp() {
        let mut config = EngineConfig::default();
        config.level.base_xp = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCurve(_))));
    }

    #[test]
    fn test_reject_overflowing_curve() {
        let mut config = EngineConfig::default();
        config.level.base_xp = 1e17;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCurve(_))));
    }

    #[test]
    fn test_reject_curve_overflowing_only_at_max_prestige() {
        // fits at prestige 0, overflows once costs are multiplied by 1 + 10 * 10000
        let mut config = EngineConfig::default();
        config.level.base_xp = 1e10;
        config.level.prestige_factor = 10_000.0;
        assert!(checked_max_threshold(&config.level, 0).is_some());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCurve(_))));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("zzlevel-config-{}.json", std::process::id()));
        std::fs::write(&path, EngineConfig::default().to_json_pretty().unwrap()).unwrap();
        let loaded = EngineConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_from_path_missing_file() {
        let path = std::env::temp_dir().join("zzlevel-config-does-not-exist.json");
        assert!(matches!(EngineConfig::from_path(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_reject_rank_tiers_not_starting_at_one() {
        let mut config = EngineConfig::default();
        config.rank_tiers[0].min_level = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRankTiers(_))
        ));
    }

    #[test]
    fn test_reject_overlapping_rank_tiers() {
        let mut config = EngineConfig::default();
        config.rank_tiers[2].min_level = 20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRankTiers(_))
        ));
    }

    #[test]
    fn test_reject_gate_beyond_max_level() {
        let mut config = EngineConfig::default();
        config
            .level_gates
            .insert(999, AchievementId::from_str("IMPOSSIBLE"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reject_missing_prestige_requirement() {
        let mut config = EngineConfig::default();
        config.prestige_requirements.remove(&3);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reject_bad_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
