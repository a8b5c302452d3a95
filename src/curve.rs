//! XP curve module.
//!
//! Provides `ThresholdTable`, the cumulative XP required to be at each
//! level for one prestige tier, and `CurveGenerator`, which builds those
//! tables from the closed-form cost formula and caches one table per
//! prestige tier.
//!
//! ```text
//! cost(1) = 0
//! cost(L) = floor(base_xp * (L - 1)^exponent * (1 + prestige * prestige_factor))
//! threshold(L) = threshold(L - 1) + cost(L)
//! ```

use crate::config::LevelConfig;
use std::sync::{Arc, OnceLock};

/// Cumulative XP thresholds for levels `1..=max_level` at one prestige tier.
///
/// The table is non-decreasing by construction and strictly increasing
/// from level 2 on, so level lookup is a binary search.
///
/// # Examples
///
/// ```rust
/// use zzlevel::config::LevelConfig;
/// use zzlevel::curve::ThresholdTable;
///
/// let table = ThresholdTable::generate(&LevelConfig::default(), 0);
/// assert_eq!(table.threshold(1), Some(0));
/// assert_eq!(table.threshold(2), Some(1000));
/// assert_eq!(table.level_for_xp(1500), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    prestige: u32,
    /// `thresholds[i]` is the XP required for level `i + 1`.
    thresholds: Vec<u64>,
}

impl ThresholdTable {
    /// Build the table for `prestige` in a single pass.
    pub fn generate(config: &LevelConfig, prestige: u32) -> Self {
        let max_level = config.max_level.max(1);

        let mut thresholds = Vec::with_capacity(max_level as usize);
        let mut cumulative: u64 = 0;
        thresholds.push(cumulative);

        for level in 2..=max_level {
            // `as` saturates out-of-range floats; validated configs never reach it
            let cost = raw_cost(config, prestige, level) as u64;
            cumulative = cumulative.saturating_add(cost);
            thresholds.push(cumulative);
        }

        Self {
            prestige,
            thresholds,
        }
    }

    /// The prestige tier this table was generated for.
    pub fn prestige(&self) -> u32 {
        self.prestige
    }

    /// Highest level in the table.
    pub fn max_level(&self) -> u32 {
        self.thresholds.len() as u32
    }

    /// Minimum cumulative XP to be at `level`, or `None` outside `1..=max_level`.
    pub fn threshold(&self, level: u32) -> Option<u64> {
        if level == 0 {
            return None;
        }
        self.thresholds.get(level as usize - 1).copied()
    }

    /// XP needed to go from `level - 1` to `level`.
    pub fn level_cost(&self, level: u32) -> Option<u64> {
        match level {
            0 => None,
            1 => Some(0),
            _ => Some(self.threshold(level)? - self.threshold(level - 1)?),
        }
    }

    /// XP still missing before a player holding `total_xp` reaches `level`.
    pub fn xp_to_reach(&self, level: u32, total_xp: u64) -> Option<u64> {
        self.threshold(level)
            .map(|needed| needed.saturating_sub(total_xp))
    }

    /// Highest level whose threshold is `<= total_xp`.
    pub fn level_for_xp(&self, total_xp: u64) -> u32 {
        // thresholds[0] == 0, so at least one entry always qualifies
        let reached = self.thresholds.partition_point(|&t| t <= total_xp);
        reached.max(1) as u32
    }

    /// Iterate `(level, threshold)` pairs in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.thresholds
            .iter()
            .enumerate()
            .map(|(idx, &xp)| (idx as u32 + 1, xp))
    }
}

fn raw_cost(config: &LevelConfig, prestige: u32, level: u32) -> f64 {
    let multiplier = 1.0 + f64::from(prestige) * config.prestige_factor;
    let steps = f64::from(level - 1);
    (config.base_xp * steps.powf(config.exponent) * multiplier).floor()
}

/// Threshold of `max_level` at `prestige`, or `None` when the cumulative
/// XP does not fit in a `u64`.
///
/// Costs grow with prestige, so checking `prestige_max` covers every tier.
pub fn checked_max_threshold(config: &LevelConfig, prestige: u32) -> Option<u64> {
    (2..=config.max_level.max(1)).try_fold(0u64, |cumulative, level| {
        let cost = raw_cost(config, prestige, level);
        // 2^64 is exactly representable; anything at or above it overflows
        if !cost.is_finite() || cost >= u64::MAX as f64 {
            return None;
        }
        cumulative.checked_add(cost as u64)
    })
}

/// Builds and caches threshold tables, one per prestige tier.
///
/// Each tier's table is populated lazily on first use and then shared
/// read-only. Two threads racing on an empty slot compute the same
/// table; only one is stored.
#[derive(Debug)]
pub struct CurveGenerator {
    config: LevelConfig,
    cache: Vec<OnceLock<Arc<ThresholdTable>>>,
}

impl CurveGenerator {
    pub fn new(config: LevelConfig) -> Self {
        let cache = Self::empty_cache(config.prestige_max);
        Self { config, cache }
    }

    fn empty_cache(prestige_max: u32) -> Vec<OnceLock<Arc<ThresholdTable>>> {
        (0..=prestige_max).map(|_| OnceLock::new()).collect()
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Threshold table for `prestige`.
    ///
    /// Prestige values above `prestige_max` are clamped to `prestige_max`.
    pub fn thresholds(&self, prestige: u32) -> Arc<ThresholdTable> {
        let tier = self.clamp_prestige(prestige);
        match self.cache.get(tier as usize) {
            Some(slot) => Arc::clone(slot.get_or_init(|| {
                log::debug!("generating XP curve for prestige {}", tier);
                Arc::new(ThresholdTable::generate(&self.config, tier))
            })),
            None => Arc::new(ThresholdTable::generate(&self.config, tier)),
        }
    }

    /// Whether the table for `prestige` has already been generated.
    pub fn is_cached(&self, prestige: u32) -> bool {
        self.cache
            .get(prestige as usize)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Drop every cached table.
    pub fn clear_cache(&mut self) {
        self.cache = Self::empty_cache(self.config.prestige_max);
    }

    /// Per-level cost at `prestige` (`cost(1) == 0`).
    pub fn level_cost(&self, level: u32, prestige: u32) -> Option<u64> {
        self.thresholds(prestige).level_cost(level)
    }

    fn clamp_prestige(&self, prestige: u32) -> u32 {
        if prestige > self.config.prestige_max {
            log::warn!(
                "prestige {} above maximum {}, clamping",
                prestige,
                self.config.prestige_max
            );
            self.config.prestige_max
        } else {
            prestige
        }
    }
}
