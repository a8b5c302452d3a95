//! Progression engine module.
//!
//! Provides the `ProgressionEngine` type, which is the main entry point
//! for progression. It owns the validated configuration and everything
//! derived from it (curve cache, rank table, skill trees, gates) and
//! applies player operations to a `PlayerProgress` record.
//!
//! The engine holds no player state. Callers load a record, pass it in
//! mutably and persist it afterwards; see [`crate::store`] for per-player
//! serialisation of that read-modify-write.

use crate::audit::Auditor;
use crate::config::EngineConfig;
use crate::curve::{CurveGenerator, ThresholdTable};
use crate::error::{ConfigError, ProgressionError};
use crate::gate::{BlockingGate, LevelGates};
use crate::ids::{AchievementId, ActivitySource, SkillKey};
use crate::level::{level_from_xp, LevelProgress};
use crate::prestige::{
    FullReset, PrestigeBonuses, PrestigeCheck, PrestigeStanding, SkillRetentionPolicy,
};
use crate::progress::PlayerProgress;
use crate::rank::{RankTable, RankTier};
use crate::skill::SkillTrees;
use crate::xp::{normalize_xp, XpSources};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of an XP award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    pub xp_gained: u64,
    /// Usable level before the award.
    pub old_level: u32,
    /// Usable level after the award, capped by the first unmet gate.
    pub new_level: u32,
    /// Level the new XP total reaches when gates are ignored.
    pub raw_level: u32,
    pub leveled_up: bool,
    pub levels_gained: u32,
    /// Unmet gates between the old level and the raw level, ascending.
    pub blocking_gates: Vec<BlockingGate>,
    pub total_xp: u64,
}

/// Result of `ProgressionEngine::unlock_achievement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub achievement: AchievementId,
    /// False when the achievement was already held.
    pub unlocked: bool,
    /// Gated levels this achievement opens that the player's XP already
    /// reaches. Gates above the raw level are left out.
    pub unblocked_levels: Vec<u32>,
    pub level_before: u32,
    pub level_after: u32,
}

/// Result of a successful `ProgressionEngine::learn_skill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLearned {
    pub skill: SkillKey,
    pub new_level: u32,
    /// Cumulative XP the level required; nothing is deducted.
    pub xp_required: u64,
}

/// Result of a successful `ProgressionEngine::prestige`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestigeOutcome {
    pub previous_prestige: u32,
    pub new_prestige: u32,
    pub level_before: u32,
    /// Level of the unchanged XP total on the steeper curve.
    pub level_after: u32,
    pub bonuses: PrestigeBonuses,
}

/// Everything a UI needs about a player, re-derived from stored XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total_xp: u64,
    pub prestige: u32,
    pub raw_level: u32,
    pub effective_level: u32,
    /// Rank of the raw level, the value `Auditor` checks claims against.
    pub rank: String,
    pub progress: LevelProgress,
    /// First gate holding the effective level below the raw level.
    pub blocking_gate: Option<BlockingGate>,
}

/// The main progression engine.
///
/// Construction validates the whole configuration and fails fast on any
/// problem. Every player operation afterwards either succeeds or returns a
/// `ProgressionError` without touching the record.
///
/// # Examples
///
/// ```rust
/// use zzlevel::*;
///
/// let engine = ProgressionEngine::new(EngineConfig::default()).unwrap();
/// let mut player = PlayerProgress::new();
///
/// // 10 hard quests at 400 XP each
/// let quest = ActivitySource::from_str("QUEST_HARD");
/// let award = engine.add_xp(&mut player, &quest, 10).unwrap();
/// assert_eq!(award.xp_gained, 4000);
/// assert_eq!(award.new_level, 3);
/// assert!(award.leveled_up);
///
/// assert_eq!(engine.rank_from_xp(player.total_xp, player.prestige).name, "F");
/// ```
pub struct ProgressionEngine {
    config: EngineConfig,
    curve: CurveGenerator,
    ranks: RankTable,
    sources: XpSources,
    skills: SkillTrees,
    gates: LevelGates,
    retention: Box<dyn SkillRetentionPolicy>,
}

impl ProgressionEngine {
    /// Validate `config` and build the engine.
    ///
    /// Skills are fully reset on prestige; use
    /// [`with_retention_policy`](Self::with_retention_policy) to change that.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let ranks = RankTable::new(&config.rank_tiers)?;
        let skills = SkillTrees::from_config(&config.skill_trees)?;
        let engine = Self {
            curve: CurveGenerator::new(config.level.clone()),
            sources: XpSources::new(config.xp_sources.clone()),
            gates: LevelGates::new(config.level_gates.clone()),
            ranks,
            skills,
            retention: Box::new(FullReset),
            config,
        };

        log::debug!(
            "progression engine ready: max level {}, {} rank tiers, {} skills, {} gates",
            engine.config.level.max_level,
            engine.ranks.tiers().len(),
            engine.skills.skills().count(),
            engine.gates.iter().count()
        );
        Ok(engine)
    }

    /// Replace the policy deciding which skills survive a prestige.
    pub fn with_retention_policy(mut self, policy: Box<dyn SkillRetentionPolicy>) -> Self {
        log::debug!("skill retention policy: {}", policy.description());
        self.retention = policy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn curve(&self) -> &CurveGenerator {
        &self.curve
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn skill_trees(&self) -> &SkillTrees {
        &self.skills
    }

    pub fn gates(&self) -> &LevelGates {
        &self.gates
    }

    pub fn sources(&self) -> &XpSources {
        &self.sources
    }

    /// Cached threshold table for `prestige`.
    pub fn thresholds(&self, prestige: u32) -> Arc<ThresholdTable> {
        self.curve.thresholds(prestige)
    }

    /// Level reached by `total_xp` at `prestige`, ignoring gates.
    pub fn level_from_xp(&self, total_xp: u64, prestige: u32) -> u32 {
        level_from_xp(&self.thresholds(prestige), total_xp)
    }

    pub fn progress(&self, total_xp: u64, prestige: u32) -> LevelProgress {
        LevelProgress::compute(&self.thresholds(prestige), total_xp)
    }

    pub fn rank_from_level(&self, level: u32) -> &RankTier {
        self.ranks.rank_from_level(level)
    }

    /// Always `rank_from_level(level_from_xp(total_xp, prestige))`.
    pub fn rank_from_xp(&self, total_xp: u64, prestige: u32) -> &RankTier {
        self.rank_from_level(self.level_from_xp(total_xp, prestige))
    }

    /// XP a batch of `count` units from `source` would award after `prior` units.
    pub fn xp_gain(
        &self,
        source: &ActivitySource,
        prior: u64,
        count: u64,
    ) -> Result<u64, ProgressionError> {
        self.sources.xp_gain(source, prior, count)
    }

    /// Usable level of `player` after applying achievement gates.
    pub fn effective_level(&self, player: &PlayerProgress) -> u32 {
        let raw = self.level_from_xp(player.total_xp, player.prestige);
        self.gates.effective_level(raw, &player.achievements)
    }

    /// Bonuses granted by a prestige tier.
    pub fn prestige_bonuses(&self, prestige: u32) -> PrestigeBonuses {
        PrestigeBonuses::for_tier(&self.config.prestige_bonuses, prestige)
    }

    /// Derive every read-only view of `player` in one call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let engine = ProgressionEngine::new(EngineConfig::default()).unwrap();
    /// let snapshot = engine.snapshot(&PlayerProgress::with_xp(1500));
    ///
    /// assert_eq!(snapshot.raw_level, 2);
    /// assert_eq!(snapshot.effective_level, 2);
    /// assert_eq!(snapshot.rank, "F");
    /// assert_eq!(snapshot.progress.xp_into_level, 500);
    /// assert!(snapshot.blocking_gate.is_none());
    /// ```
    pub fn snapshot(&self, player: &PlayerProgress) -> ProgressSnapshot {
        let table = self.thresholds(player.prestige);
        let raw_level = table.level_for_xp(player.total_xp);
        ProgressSnapshot {
            total_xp: player.total_xp,
            prestige: player.prestige,
            raw_level,
            effective_level: self.gates.effective_level(raw_level, &player.achievements),
            rank: self.ranks.rank_from_level(raw_level).name.clone(),
            progress: LevelProgress::compute(&table, player.total_xp),
            blocking_gate: self.gates.first_blocker(raw_level, &player.achievements),
        }
    }

    /// Award XP for `count` units of `source`.
    ///
    /// Diminishing returns continue from the player's stored count for the
    /// source, which is advanced by `count`. XP is always credited in full;
    /// gates only cap the reported level.
    ///
    /// # Errors
    ///
    /// `UnknownSource` when `source` has no configuration. The record is
    /// not modified in that case.
    pub fn add_xp(
        &self,
        player: &mut PlayerProgress,
        source: &ActivitySource,
        count: u64,
    ) -> Result<XpAward, ProgressionError> {
        let prior = player.activity_count(source);
        let gained = self.sources.xp_gain(source, prior, count)?;

        player
            .activity_counts
            .insert(source.clone(), prior.saturating_add(count));
        Ok(self.credit(player, gained))
    }

    /// Award a flat XP amount that bypasses source configuration.
    ///
    /// Negative amounts are treated as 0.
    pub fn add_raw_xp(&self, player: &mut PlayerProgress, amount: i64) -> XpAward {
        self.credit(player, normalize_xp(amount))
    }

    fn credit(&self, player: &mut PlayerProgress, gained: u64) -> XpAward {
        let table = self.thresholds(player.prestige);
        let before = player.total_xp;
        let old_level = self
            .gates
            .effective_level(table.level_for_xp(before), &player.achievements);

        let total_xp = before.saturating_add(gained);
        if total_xp - before != gained {
            log::warn!("XP total saturated at {} for a gain of {}", total_xp, gained);
        }
        player.total_xp = total_xp;

        let raw_level = table.level_for_xp(total_xp);
        let scan = self.gates.scan(old_level, raw_level, &player.achievements);
        let new_level = scan.capped_level.max(old_level);

        if let Some(gate) = scan.blocking.first() {
            log::debug!(
                "level {} held at {} by gate {} ({})",
                raw_level,
                new_level,
                gate.level,
                gate.required_achievement
            );
        }
        if new_level > old_level {
            log::info!("level up: {} -> {} ({} XP)", old_level, new_level, total_xp);
        }

        XpAward {
            xp_gained: total_xp - before,
            old_level,
            new_level,
            raw_level,
            leveled_up: new_level > old_level,
            levels_gained: new_level - old_level,
            blocking_gates: scan.blocking,
            total_xp,
        }
    }

    /// Grant an achievement. Idempotent.
    ///
    /// XP is untouched; the levels this achievement gates become usable on
    /// the next read because levels are always re-derived.
    pub fn unlock_achievement(
        &self,
        player: &mut PlayerProgress,
        achievement: &AchievementId,
    ) -> AchievementUnlock {
        let level_before = self.effective_level(player);
        if !player.achievements.insert(achievement.clone()) {
            return AchievementUnlock {
                achievement: achievement.clone(),
                unlocked: false,
                unblocked_levels: Vec::new(),
                level_before,
                level_after: level_before,
            };
        }

        let level_after = self.effective_level(player);
        let raw_level = self.level_from_xp(player.total_xp, player.prestige);
        let unblocked_levels = self
            .gates
            .levels_requiring(achievement)
            .into_iter()
            .filter(|&level| level <= raw_level)
            .collect();
        log::info!(
            "achievement {} unlocked (level {} -> {})",
            achievement,
            level_before,
            level_after
        );
        AchievementUnlock {
            achievement: achievement.clone(),
            unlocked: true,
            unblocked_levels,
            level_before,
            level_after,
        }
    }

    /// Raise `skill` by one level.
    ///
    /// Checks, in order: the skill exists, it is below its max level, every
    /// prerequisite is met, and total XP covers `xp_cost * (level + 1)`.
    /// No XP is deducted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let engine = ProgressionEngine::new(EngineConfig::default()).unwrap();
    /// let mut player = PlayerProgress::with_xp(1500);
    /// let strength = SkillKey::new("COMBAT", "STRENGTH");
    ///
    /// for _ in 0..3 {
    ///     engine.learn_skill(&mut player, &strength).unwrap();
    /// }
    /// assert_eq!(player.skill_level(&strength), 3);
    /// assert_eq!(player.total_xp, 1500);
    ///
    /// let err = engine.learn_skill(&mut player, &strength).unwrap_err();
    /// assert_eq!(err, ProgressionError::InsufficientXp { required: 2000, available: 1500 });
    /// ```
    pub fn learn_skill(
        &self,
        player: &mut PlayerProgress,
        skill: &SkillKey,
    ) -> Result<SkillLearned, ProgressionError> {
        let plan = self
            .skills
            .check_learn(skill, &player.skills, player.total_xp)?;
        player.set_skill_level(&plan.key, plan.new_level);

        log::info!("skill {} learned to level {}", plan.key, plan.new_level);
        Ok(SkillLearned {
            skill: plan.key,
            new_level: plan.new_level,
            xp_required: plan.xp_required,
        })
    }

    /// Check the requirements for the next prestige tier.
    ///
    /// Uses the level of the XP total on the current curve, ignoring gates.
    pub fn can_prestige(&self, player: &PlayerProgress) -> PrestigeCheck {
        let standing = PrestigeStanding {
            prestige: player.prestige,
            level: self.level_from_xp(player.total_xp, player.prestige),
            total_xp: player.total_xp,
            achievement_count: player.achievement_count(),
        };
        let requirement = self
            .config
            .prestige_requirements
            .get(&player.prestige.saturating_add(1));
        PrestigeCheck::evaluate(standing, self.config.level.prestige_max, requirement)
    }

    /// Move `player` to the next prestige tier.
    ///
    /// XP and achievements are kept; skills pass through the retention
    /// policy. The player's level is re-derived on the steeper curve.
    ///
    /// # Errors
    ///
    /// `MaxPrestigeReached` at the last tier, `PrestigeUnavailable` with
    /// every unmet requirement otherwise.
    pub fn prestige(&self, player: &mut PlayerProgress) -> Result<PrestigeOutcome, ProgressionError> {
        let check = self.can_prestige(player);
        if check.at_max_prestige {
            return Err(ProgressionError::MaxPrestigeReached(
                self.config.level.prestige_max,
            ));
        }
        if !check.eligible {
            return Err(ProgressionError::PrestigeUnavailable {
                reasons: check.unmet,
            });
        }

        let previous_prestige = player.prestige;
        let level_before = self.level_from_xp(player.total_xp, previous_prestige);

        player.prestige = check.target_prestige;
        player.skills = self
            .retention
            .skills_after_prestige(&player.skills, player.prestige);

        let level_after = self.level_from_xp(player.total_xp, player.prestige);
        log::info!(
            "prestige {} -> {} (level {} -> {}, skills: {})",
            previous_prestige,
            player.prestige,
            level_before,
            level_after,
            self.retention.description()
        );

        Ok(PrestigeOutcome {
            previous_prestige,
            new_prestige: player.prestige,
            level_before,
            level_after,
            bonuses: self.prestige_bonuses(player.prestige),
        })
    }

    /// Read-only verifier over this engine's curve and rank table.
    pub fn auditor(&self) -> Auditor<'_> {
        Auditor::new(&self.curve, &self.ranks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrestigeRequirement;
    use crate::skill::SkillLevels;
    use std::collections::BTreeMap;

    fn engine() -> ProgressionEngine {
        ProgressionEngine::new(EngineConfig::default()).unwrap()
    }

    fn source(name: &str) -> ActivitySource {
        ActivitySource::from_str(name)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.level.base_xp = 0.0;
        assert!(ProgressionEngine::new(config).is_err());
    }

    #[test]
    fn test_add_xp_unknown_source_leaves_record() {
        let engine = engine();
        let mut player = PlayerProgress::with_xp(10);
        let err = engine
            .add_xp(&mut player, &source("FISHING"), 3)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::UnknownSource(_)));
        assert_eq!(player, PlayerProgress::with_xp(10));
    }

    #[test]
    fn test_add_xp_tracks_activity_counts() {
        let engine = engine();
        let mut player = PlayerProgress::new();
        let mob = source("MOB_COMMON");
        player.activity_counts.insert(mob.clone(), 999);

        // unit 999 is full value, 1000 is decay^0, 1001 is decay^1
        let award = engine.add_xp(&mut player, &mob, 3).unwrap();
        assert_eq!(award.xp_gained, 10 + 10 + 8);
        assert_eq!(player.activity_count(&mob), 1002);
        assert_eq!(player.total_xp, 28);
    }

    #[test]
    fn test_add_raw_xp_negative_is_zero() {
        let engine = engine();
        let mut player = PlayerProgress::with_xp(500);
        let award = engine.add_raw_xp(&mut player, -250);
        assert_eq!(award.xp_gained, 0);
        assert_eq!(player.total_xp, 500);
        assert!(!award.leveled_up);
    }

    #[test]
    fn test_gate_caps_and_unlock_releases() {
        let engine = engine();
        let mut player = PlayerProgress::new();
        let xp_20 = engine.thresholds(0).threshold(20).unwrap();

        let award = engine.add_raw_xp(&mut player, xp_20 as i64);
        assert_eq!(award.raw_level, 20);
        assert_eq!(award.new_level, 9);
        assert_eq!(award.levels_gained, 8);
        assert_eq!(award.blocking_gates.len(), 1);
        assert_eq!(award.blocking_gates[0].level, 10);
        assert_eq!(player.total_xp, xp_20);

        let unlock = engine.unlock_achievement(&mut player, &AchievementId::from_str("FIRST_DUNGEON"));
        assert!(unlock.unlocked);
        assert_eq!(unlock.unblocked_levels, vec![10]);
        assert_eq!(unlock.level_before, 9);
        assert_eq!(unlock.level_after, 20);
        assert_eq!(player.total_xp, xp_20);
    }

    #[test]
    fn test_unlock_ahead_of_gate_opens_nothing() {
        let engine = engine();
        let mut player = PlayerProgress::new();

        let unlock = engine.unlock_achievement(&mut player, &AchievementId::from_str("MONARCH_TRIAL"));
        assert!(unlock.unlocked);
        assert!(unlock.unblocked_levels.is_empty());
        assert_eq!(unlock.level_before, 1);
        assert_eq!(unlock.level_after, 1);

        let xp_300 = engine.thresholds(0).threshold(300).unwrap();
        let mut veteran = PlayerProgress::with_xp(xp_300);
        let unlock = engine.unlock_achievement(&mut veteran, &AchievementId::from_str("MONARCH_TRIAL"));
        assert_eq!(unlock.unblocked_levels, vec![300]);
    }

    #[test]
    fn test_capped_player_stays_capped() {
        let engine = engine();
        let mut player = PlayerProgress::new();
        let xp_20 = engine.thresholds(0).threshold(20).unwrap();
        engine.add_raw_xp(&mut player, xp_20 as i64);

        let award = engine.add_raw_xp(&mut player, 1000);
        assert_eq!(award.old_level, 9);
        assert_eq!(award.new_level, 9);
        assert!(!award.leveled_up);
        assert_eq!(award.blocking_gates[0].level, 10);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let engine = engine();
        let mut player = PlayerProgress::new();
        let id = AchievementId::from_str("GUILD_INITIATION");
        assert!(engine.unlock_achievement(&mut player, &id).unlocked);

        let again = engine.unlock_achievement(&mut player, &id);
        assert!(!again.unlocked);
        assert!(again.unblocked_levels.is_empty());
        assert_eq!(player.achievement_count(), 1);
    }

    #[test]
    fn test_learn_skill_does_not_spend_xp() {
        let engine = engine();
        let mut player = PlayerProgress::with_xp(2000);
        let strength = SkillKey::new("COMBAT", "STRENGTH");
        let vitality = SkillKey::new("ENDURANCE", "VITALITY");

        let learned = engine.learn_skill(&mut player, &strength).unwrap();
        assert_eq!(learned.new_level, 1);
        assert_eq!(learned.xp_required, 500);
        engine.learn_skill(&mut player, &vitality).unwrap();
        assert_eq!(player.total_xp, 2000);
        assert_eq!(player.skill_level(&vitality), 1);
    }

    #[test]
    fn test_learn_skill_failure_leaves_record() {
        let engine = engine();
        let mut player = PlayerProgress::with_xp(1_000_000);
        let crit = SkillKey::new("COMBAT", "CRITICAL_HIT");
        let before = player.clone();
        assert!(matches!(
            engine.learn_skill(&mut player, &crit),
            Err(ProgressionError::PrerequisiteNotMet { .. })
        ));
        assert_eq!(player, before);
    }

    fn small_prestige_engine() -> ProgressionEngine {
        let mut config = EngineConfig::default();
        config.level.prestige_max = 2;
        config.prestige_requirements = BTreeMap::from([
            (
                1,
                PrestigeRequirement {
                    level: 5,
                    total_xp: 20_000,
                    achievement_count: 1,
                },
            ),
            (
                2,
                PrestigeRequirement {
                    level: 5,
                    total_xp: 20_000,
                    achievement_count: 1,
                },
            ),
        ]);
        ProgressionEngine::new(config).unwrap()
    }

    #[test]
    fn test_prestige_keeps_xp_and_achievements() {
        let engine = small_prestige_engine();
        let mut player = PlayerProgress::with_xp(20_000);
        engine.unlock_achievement(&mut player, &AchievementId::from_str("FIRST_DUNGEON"));
        engine
            .learn_skill(&mut player, &SkillKey::new("MIND", "FOCUS"))
            .unwrap();
        let achievements = player.achievements.clone();

        let outcome = engine.prestige(&mut player).unwrap();
        assert_eq!(outcome.previous_prestige, 0);
        assert_eq!(outcome.new_prestige, 1);
        assert!(outcome.level_after <= outcome.level_before);
        assert_eq!(player.total_xp, 20_000);
        assert_eq!(player.achievements, achievements);
        assert_eq!(player.skills, SkillLevels::new());
        assert_eq!(outcome.bonuses.stat_point_bonus, 5);
    }

    #[test]
    fn test_prestige_reports_unmet_requirements() {
        let engine = small_prestige_engine();
        let mut player = PlayerProgress::with_xp(100);
        match engine.prestige(&mut player) {
            Err(ProgressionError::PrestigeUnavailable { reasons }) => assert_eq!(reasons.len(), 3),
            other => panic!("Expected PrestigeUnavailable, got {:?}", other),
        }
        assert_eq!(player.prestige, 0);
    }

    #[test]
    fn test_prestige_stops_at_max() {
        let engine = small_prestige_engine();
        let mut player = PlayerProgress::with_xp(20_000);
        player.achievements.insert(AchievementId::from_str("X"));
        engine.prestige(&mut player).unwrap();
        engine.prestige(&mut player).unwrap();
        assert_eq!(
            engine.prestige(&mut player).unwrap_err(),
            ProgressionError::MaxPrestigeReached(2)
        );
        assert!(engine.can_prestige(&player).at_max_prestige);
    }

    struct KeepEverything;

    impl SkillRetentionPolicy for KeepEverything {
        fn skills_after_prestige(&self, old: &SkillLevels, _new_prestige: u32) -> SkillLevels {
            old.clone()
        }

        fn description(&self) -> String {
            "keep everything".to_string()
        }
    }

    #[test]
    fn test_custom_retention_policy() {
        let engine = small_prestige_engine().with_retention_policy(Box::new(KeepEverything));
        let mut player = PlayerProgress::with_xp(20_000);
        player.achievements.insert(AchievementId::from_str("X"));
        let focus = SkillKey::new("MIND", "FOCUS");
        engine.learn_skill(&mut player, &focus).unwrap();

        engine.prestige(&mut player).unwrap();
        assert_eq!(player.skill_level(&focus), 1);
    }

    #[test]
    fn test_snapshot_reports_blocking_gate() {
        let engine = engine();
        let xp_12 = engine.thresholds(0).threshold(12).unwrap();
        let snapshot = engine.snapshot(&PlayerProgress::with_xp(xp_12));
        assert_eq!(snapshot.raw_level, 12);
        assert_eq!(snapshot.effective_level, 9);
        assert_eq!(snapshot.rank, "F");
        assert_eq!(snapshot.blocking_gate.map(|g| g.level), Some(10));
    }

    #[test]
    fn test_auditor_uses_engine_tables() {
        let engine = engine();
        let check = engine.auditor().validate_rank_against_xp("F", 1500, 0);
        assert!(check.is_valid);
    }
}
