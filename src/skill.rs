//! Skill trees.
//!
//! Skills are organised in named trees. Learning the next level of a
//! skill requires every prerequisite skill at its minimum level and a
//! cumulative XP total of at least `xp_cost * (current_level + 1)`.
//! XP is never spent: the same total can satisfy any number of skills.
//!
//! Prerequisites are written as comma-separated `skill:level` pairs. A
//! bare skill name refers to the skill's own tree (underscores included,
//! so `CRITICAL_HIT:3` is same-tree); `TREE.skill:level` addresses
//! another tree. Expressions are parsed once when the trees are built.

use crate::config::SkillDefinition;
use crate::error::{ConfigError, ProgressionError};
use crate::graph::SkillGraph;
use crate::ids::{SkillId, SkillKey, TreeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Learned skill levels, keyed by tree then skill.
pub type SkillLevels = BTreeMap<TreeId, BTreeMap<SkillId, u32>>;

/// Current level of `key` in `levels` (0 when never learned).
pub fn skill_level(levels: &SkillLevels, key: &SkillKey) -> u32 {
    levels
        .get(&key.tree)
        .and_then(|skills| skills.get(&key.skill))
        .copied()
        .unwrap_or(0)
}

/// One `skill:level` requirement.
///
/// # Examples
///
/// ```rust
/// use zzlevel::skill::Prerequisite;
///
/// let same_tree: Prerequisite = "STRENGTH:5".parse().unwrap();
/// assert!(same_tree.tree.is_none());
/// assert_eq!(same_tree.min_level, 5);
///
/// let cross_tree: Prerequisite = "ENDURANCE.VITALITY:2".parse().unwrap();
/// assert_eq!(cross_tree.tree.as_ref().map(|t| t.as_str()), Some("ENDURANCE"));
/// assert_eq!(cross_tree.skill.as_str(), "VITALITY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    /// `None` means the tree of the skill that declares the requirement.
    pub tree: Option<TreeId>,
    pub skill: SkillId,
    pub min_level: u32,
}

impl Prerequisite {
    /// Parse a comma-separated list. Blank input means no prerequisites.
    pub fn parse_list(expr: &str) -> Result<Vec<Prerequisite>, String> {
        if expr.trim().is_empty() {
            return Ok(Vec::new());
        }
        expr.split(',')
            .map(|entry| entry.parse::<Prerequisite>())
            .collect()
    }

    /// Fully qualified key, resolving a bare name against `home`.
    pub fn resolve(&self, home: &TreeId) -> SkillKey {
        SkillKey {
            tree: self.tree.clone().unwrap_or_else(|| home.clone()),
            skill: self.skill.clone(),
        }
    }
}

impl FromStr for Prerequisite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();
        let (name, level) = entry
            .rsplit_once(':')
            .ok_or_else(|| format!("entry {:?} is missing ':level'", entry))?;
        let min_level = level
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("entry {:?} has a non-numeric level", entry))?;

        let name = name.trim();
        let (tree, skill) = match name.split_once('.') {
            Some((tree, skill)) => (Some(tree.trim()), skill.trim()),
            None => (None, name),
        };

        if skill.is_empty() || skill.contains('.') || tree.is_some_and(str::is_empty) {
            return Err(format!("entry {:?} has an invalid skill name", entry));
        }

        Ok(Self {
            tree: tree.map(TreeId::from_str),
            skill: SkillId::from_str(skill),
            min_level,
        })
    }
}

/// A skill with its prerequisites resolved to fully qualified keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillNode {
    pub key: SkillKey,
    pub max_level: u32,
    pub xp_cost: u64,
    pub prerequisites: Vec<(SkillKey, u32)>,
}

impl SkillNode {
    /// Cumulative XP needed to learn the level after `current_level`.
    pub fn next_cost(&self, current_level: u32) -> u64 {
        self.xp_cost.saturating_mul(u64::from(current_level) + 1)
    }
}

/// A validated learning step, computed before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnPlan {
    pub key: SkillKey,
    pub new_level: u32,
    pub xp_required: u64,
}

/// All configured skill trees plus their prerequisite graph.
#[derive(Debug, Clone)]
pub struct SkillTrees {
    skills: BTreeMap<SkillKey, SkillNode>,
    trees: BTreeSet<TreeId>,
    graph: SkillGraph,
}

impl SkillTrees {
    /// Parse prerequisites, resolve their targets and reject cycles.
    pub fn from_config(
        config: &BTreeMap<TreeId, BTreeMap<SkillId, SkillDefinition>>,
    ) -> Result<Self, ConfigError> {
        let mut skills = BTreeMap::new();
        let mut graph = SkillGraph::new();

        for (tree, defs) in config {
            for (skill, def) in defs {
                let key = SkillKey::new(tree.clone(), skill.clone());
                let expr = def.prerequisite.as_deref().unwrap_or("");
                let parsed = Prerequisite::parse_list(expr).map_err(|reason| {
                    ConfigError::MalformedPrerequisite {
                        skill: key.clone(),
                        expr: expr.to_string(),
                        reason,
                    }
                })?;

                graph.add_node(key.clone());
                let prerequisites: Vec<(SkillKey, u32)> = parsed
                    .iter()
                    .map(|p| (p.resolve(tree), p.min_level))
                    .collect();
                for (target, _) in &prerequisites {
                    graph.add_edge(key.clone(), target.clone());
                }

                skills.insert(
                    key.clone(),
                    SkillNode {
                        key,
                        max_level: def.max_level,
                        xp_cost: def.xp_cost,
                        prerequisites,
                    },
                );
            }
        }

        for node in skills.values() {
            for (target, _) in &node.prerequisites {
                if !skills.contains_key(target) {
                    return Err(ConfigError::UnknownPrerequisite {
                        skill: node.key.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        graph.detect_cycles()?;

        Ok(Self {
            skills,
            trees: config.keys().cloned().collect(),
            graph,
        })
    }

    pub fn trees(&self) -> impl Iterator<Item = &TreeId> {
        self.trees.iter()
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillNode> {
        self.skills.values()
    }

    pub fn graph(&self) -> &SkillGraph {
        &self.graph
    }

    pub fn get(&self, key: &SkillKey) -> Result<&SkillNode, ProgressionError> {
        self.skills
            .get(key)
            .ok_or_else(|| ProgressionError::SkillNotFound(key.clone()))
    }

    /// XP total needed for the next level of `key`, or `None` at max level.
    pub fn next_cost(
        &self,
        key: &SkillKey,
        levels: &SkillLevels,
    ) -> Result<Option<u64>, ProgressionError> {
        let node = self.get(key)?;
        let current = skill_level(levels, key);
        Ok((current < node.max_level).then(|| node.next_cost(current)))
    }

    /// Check every learning rule in order without mutating anything.
    ///
    /// Order: unknown skill, max level, prerequisites, XP.
    pub fn check_learn(
        &self,
        key: &SkillKey,
        levels: &SkillLevels,
        total_xp: u64,
    ) -> Result<LearnPlan, ProgressionError> {
        let node = self.get(key)?;
        let current = skill_level(levels, key);

        if current >= node.max_level {
            return Err(ProgressionError::MaxLevelReached {
                skill: key.clone(),
                max_level: node.max_level,
            });
        }

        for (target, min_level) in &node.prerequisites {
            let have = skill_level(levels, target);
            if have < *min_level {
                return Err(ProgressionError::PrerequisiteNotMet {
                    skill: key.clone(),
                    detail: format!("requires {} level {}, have {}", target, min_level, have),
                });
            }
        }

        let required = node.next_cost(current);
        if total_xp < required {
            return Err(ProgressionError::InsufficientXp {
                required,
                available: total_xp,
            });
        }

        Ok(LearnPlan {
            key: key.clone(),
            new_level: current + 1,
            xp_required: required,
        })
    }

    /// Skills whose next level could be learned right now.
    pub fn learnable_skills(&self, levels: &SkillLevels, total_xp: u64) -> Vec<SkillKey> {
        self.skills
            .keys()
            .filter(|key| self.check_learn(key, levels, total_xp).is_ok())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn trees() -> SkillTrees {
        SkillTrees::from_config(&EngineConfig::default().skill_trees).unwrap()
    }

    fn levels(entries: &[(&str, &str, u32)]) -> SkillLevels {
        let mut levels = SkillLevels::new();
        for (tree, skill, level) in entries {
            levels
                .entry(TreeId::from_str(tree))
                .or_default()
                .insert(SkillId::from_str(skill), *level);
        }
        levels
    }

    #[test]
    fn test_parse_list() {
        let parsed = Prerequisite::parse_list("CRITICAL_HIT:3, ENDURANCE.VITALITY:2").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].tree, None);
        assert_eq!(parsed[0].skill.as_str(), "CRITICAL_HIT");
        assert_eq!(parsed[1].tree, Some(TreeId::from_str("ENDURANCE")));
        assert_eq!(parsed[1].min_level, 2);
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert!(Prerequisite::parse_list("").unwrap().is_empty());
        assert!(Prerequisite::parse_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("STRENGTH".parse::<Prerequisite>().is_err());
        assert!("STRENGTH:five".parse::<Prerequisite>().is_err());
        assert!(":5".parse::<Prerequisite>().is_err());
        assert!(".STRENGTH:5".parse::<Prerequisite>().is_err());
        assert!("A.B.C:1".parse::<Prerequisite>().is_err());
        assert!(Prerequisite::parse_list("STRENGTH:5,,FOCUS:1").is_err());
    }

    #[test]
    fn test_underscore_name_stays_in_tree() {
        let prereq: Prerequisite = "IRON_SKIN:1".parse().unwrap();
        let key = prereq.resolve(&TreeId::from_str("ENDURANCE"));
        assert_eq!(key, SkillKey::new("ENDURANCE", "IRON_SKIN"));
    }

    #[test]
    fn test_unknown_skill() {
        let err = trees()
            .check_learn(&SkillKey::new("COMBAT", "FIREBALL"), &SkillLevels::new(), 1_000_000)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::SkillNotFound(_)));

        let err = trees()
            .check_learn(&SkillKey::new("COOKING", "STEW"), &SkillLevels::new(), 0)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::SkillNotFound(_)));
    }

    #[test]
    fn test_max_level_checked_before_prerequisites() {
        let key = SkillKey::new("COMBAT", "CRITICAL_HIT");
        let err = trees()
            .check_learn(&key, &levels(&[("COMBAT", "CRITICAL_HIT", 5)]), 0)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::MaxLevelReached { max_level: 5, .. }));
    }

    #[test]
    fn test_prerequisite_checked_before_xp() {
        let key = SkillKey::new("COMBAT", "CRITICAL_HIT");
        let err = trees()
            .check_learn(&key, &levels(&[("COMBAT", "STRENGTH", 4)]), 0)
            .unwrap_err();
        match err {
            ProgressionError::PrerequisiteNotMet { detail, .. } => {
                assert!(detail.contains("COMBAT.STRENGTH"));
                assert!(detail.contains("level 5"));
            }
            other => panic!("Expected PrerequisiteNotMet, got {:?}", other),
        }
    }

    #[test]
    fn test_cross_tree_prerequisite() {
        let key = SkillKey::new("COMBAT", "BERSERK");
        let base = levels(&[("COMBAT", "CRITICAL_HIT", 3)]);
        let err = trees().check_learn(&key, &base, 1_000_000).unwrap_err();
        assert!(matches!(err, ProgressionError::PrerequisiteNotMet { .. }));

        let ready = levels(&[("COMBAT", "CRITICAL_HIT", 3), ("ENDURANCE", "VITALITY", 2)]);
        let plan = trees().check_learn(&key, &ready, 1_000_000).unwrap();
        assert_eq!(plan.new_level, 1);
        assert_eq!(plan.xp_required, 5000);
    }

    #[test]
    fn test_insufficient_xp_reports_cost() {
        let key = SkillKey::new("COMBAT", "STRENGTH");
        // level 2 -> 3 costs 500 * 3
        let err = trees()
            .check_learn(&key, &levels(&[("COMBAT", "STRENGTH", 2)]), 1499)
            .unwrap_err();
        assert_eq!(
            err,
            ProgressionError::InsufficientXp {
                required: 1500,
                available: 1499
            }
        );
    }

    #[test]
    fn test_next_cost() {
        let trees = trees();
        let key = SkillKey::new("COMBAT", "STRENGTH");
        assert_eq!(trees.next_cost(&key, &SkillLevels::new()).unwrap(), Some(500));
        let maxed = levels(&[("COMBAT", "STRENGTH", 10)]);
        assert_eq!(trees.next_cost(&key, &maxed).unwrap(), None);
    }

    #[test]
    fn test_learnable_skills_with_no_progress() {
        let learnable = trees().learnable_skills(&SkillLevels::new(), 500);
        assert_eq!(
            learnable,
            vec![
                SkillKey::new("COMBAT", "STRENGTH"),
                SkillKey::new("ENDURANCE", "VITALITY"),
                SkillKey::new("MIND", "FOCUS"),
            ]
        );
    }

    #[test]
    fn test_reject_unknown_prerequisite_target() {
        let mut config = EngineConfig::default().skill_trees;
        config
            .get_mut(&TreeId::from_str("MIND"))
            .unwrap()
            .insert(
                SkillId::from_str("TELEPATHY"),
                SkillDefinition::new(1, 100).requires("COMBAT.MIND_READ:1"),
            );
        assert!(matches!(
            SkillTrees::from_config(&config),
            Err(ConfigError::UnknownPrerequisite { .. })
        ));
    }

    #[test]
    fn test_reject_prerequisite_cycle() {
        let mut tree = BTreeMap::new();
        tree.insert(SkillId::from_str("A"), SkillDefinition::new(1, 1).requires("B:1"));
        tree.insert(SkillId::from_str("B"), SkillDefinition::new(1, 1).requires("A:1"));
        let mut config = BTreeMap::new();
        config.insert(TreeId::from_str("LOOP"), tree);
        assert!(matches!(
            SkillTrees::from_config(&config),
            Err(ConfigError::PrerequisiteCycle { .. })
        ));
    }

    #[test]
    fn test_reject_malformed_expression() {
        let mut tree = BTreeMap::new();
        tree.insert(SkillId::from_str("A"), SkillDefinition::new(1, 1).requires("B=1"));
        let mut config = BTreeMap::new();
        config.insert(TreeId::from_str("BAD"), tree);
        assert!(matches!(
            SkillTrees::from_config(&config),
            Err(ConfigError::MalformedPrerequisite { .. })
        ));
    }
}
