//! Rank resolution.
//!
//! A rank is a named band of levels. Ranks are always derived from a
//! level, never from XP directly: `rank_from_xp` is exactly
//! `rank_from_level(level_from_xp(..))`.

use crate::config::RankTierConfig;
use crate::curve::ThresholdTable;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// One rank tier with its level band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
    pub name: String,
    pub min_level: u32,
    /// Last level of the band; `None` for the open-ended top tier.
    pub max_level: Option<u32>,
}

impl RankTier {
    pub fn contains(&self, level: u32) -> bool {
        level >= self.min_level && self.max_level.map_or(true, |max| level <= max)
    }
}

/// Ordered, contiguous partition of `[1, +inf)` into rank tiers.
///
/// # Examples
///
/// ```rust
/// use zzlevel::config::RankTierConfig;
/// use zzlevel::RankTable;
///
/// let table = RankTable::new(&[
///     RankTierConfig { name: "F".into(), min_level: 1 },
///     RankTierConfig { name: "E".into(), min_level: 20 },
/// ]).unwrap();
///
/// assert_eq!(table.rank_from_level(19).name, "F");
/// assert_eq!(table.rank_from_level(20).name, "E");
/// assert_eq!(table.rank_from_level(5000).name, "E");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

impl RankTable {
    pub fn new(configs: &[RankTierConfig]) -> Result<Self, ConfigError> {
        let first = configs
            .first()
            .ok_or_else(|| ConfigError::InvalidRankTiers("no tiers configured".into()))?;
        if first.min_level != 1 {
            return Err(ConfigError::InvalidRankTiers(format!(
                "first tier {} must start at level 1",
                first.name
            )));
        }

        let mut tiers = Vec::with_capacity(configs.len());
        for (idx, cfg) in configs.iter().enumerate() {
            let max_level = match configs.get(idx + 1) {
                Some(next) if next.min_level > cfg.min_level => Some(next.min_level - 1),
                Some(next) => {
                    return Err(ConfigError::InvalidRankTiers(format!(
                        "tier {} does not start above {}",
                        next.name, cfg.name
                    )))
                }
                None => None,
            };
            tiers.push(RankTier {
                name: cfg.name.clone(),
                min_level: cfg.min_level,
                max_level,
            });
        }

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    /// Rank for `level`. Level 0 resolves to the lowest tier.
    pub fn rank_from_level(&self, level: u32) -> &RankTier {
        let idx = self.tier_index(level);
        &self.tiers[idx]
    }

    /// Rank reached with `total_xp` on this curve.
    pub fn rank_from_xp(&self, table: &ThresholdTable, total_xp: u64) -> &RankTier {
        self.rank_from_level(table.level_for_xp(total_xp))
    }

    /// Tier by name.
    pub fn find(&self, name: &str) -> Option<&RankTier> {
        self.tiers.iter().find(|tier| tier.name == name)
    }

    /// The tier above `level`'s tier and how many levels away it starts.
    pub fn next_tier(&self, level: u32) -> Option<(&RankTier, u32)> {
        let next = self.tiers.get(self.tier_index(level) + 1)?;
        Some((next, next.min_level.saturating_sub(level)))
    }

    fn tier_index(&self, level: u32) -> usize {
        // tiers are sorted by min_level and the table is never empty
        self.tiers
            .partition_point(|tier| tier.min_level <= level)
            .saturating_sub(1)
    }
}
