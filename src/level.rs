//! Level resolution.
//!
//! Maps cumulative XP to a level through a `ThresholdTable` and reports
//! progress toward the next level.

use crate::curve::ThresholdTable;
use serde::{Deserialize, Serialize};

/// Level reached with `total_xp` on this curve.
pub fn level_from_xp(table: &ThresholdTable, total_xp: u64) -> u32 {
    table.level_for_xp(total_xp)
}

/// Progress of a player toward their next level.
///
/// # Examples
///
/// ```rust
/// use zzlevel::config::LevelConfig;
/// use zzlevel::curve::ThresholdTable;
/// use zzlevel::LevelProgress;
///
/// let table = ThresholdTable::generate(&LevelConfig::default(), 0);
/// let progress = LevelProgress::compute(&table, 1500);
///
/// assert_eq!(progress.current_level, 2);
/// assert_eq!(progress.next_level, 3);
/// assert_eq!(progress.xp_into_level, 500);
/// assert_eq!(progress.xp_needed_for_next, 2265);
/// assert_eq!(progress.percent_to_next, 22);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub current_level: u32,
    /// Equal to `current_level` at the level cap.
    pub next_level: u32,
    /// XP earned past the current level's threshold.
    pub xp_into_level: u64,
    /// Width of the current level band (cost of the next level).
    pub xp_needed_for_next: u64,
    /// Rounded percentage in `0..=100`.
    pub percent_to_next: u8,
    pub is_max_level: bool,
}

impl LevelProgress {
    pub fn compute(table: &ThresholdTable, total_xp: u64) -> Self {
        let current_level = table.level_for_xp(total_xp);
        let floor = table.threshold(current_level).unwrap_or(0);
        let xp_into_level = total_xp.saturating_sub(floor);

        if current_level >= table.max_level() {
            return Self {
                current_level,
                next_level: current_level,
                xp_into_level,
                xp_needed_for_next: 0,
                percent_to_next: 100,
                is_max_level: true,
            };
        }

        let next_level = current_level + 1;
        let xp_needed_for_next = table.level_cost(next_level).unwrap_or(0);

        Self {
            current_level,
            next_level,
            xp_into_level,
            xp_needed_for_next,
            percent_to_next: rounded_percent(xp_into_level, xp_needed_for_next),
            is_max_level: false,
        }
    }

    /// XP still missing before `next_level`.
    pub fn xp_remaining(&self) -> u64 {
        self.xp_needed_for_next.saturating_sub(self.xp_into_level)
    }
}

fn rounded_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 100;
    }
    let part = u128::from(part.min(whole));
    let whole = u128::from(whole);
    // round half up
    ((part * 200 + whole) / (whole * 2)) as u8
}
