//! XP award math.
//!
//! Each activity source yields `base` XP per unit until the player has
//! earned `diminishing_after` units from it in total; unit `i` past that
//! yields `floor(base * rate^(i - diminishing_after))`. The unit index is
//! cumulative across calls, so callers pass how many units were already
//! counted before this batch.

use crate::config::XpSourceConfig;
use crate::error::ProgressionError;
use crate::ids::ActivitySource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decay rate actually applied. `EngineConfig::validate` rejects rates
/// outside `[0, 1]`; for unvalidated input, rates above 1 (and NaN) mean
/// no decay and negative rates mean 0.
fn decay_rate(config: &XpSourceConfig) -> f64 {
    if config.diminishing_rate.is_nan() {
        1.0
    } else {
        config.diminishing_rate.clamp(0.0, 1.0)
    }
}

/// XP yielded by the unit with cumulative index `index` (0-based).
pub fn unit_xp(config: &XpSourceConfig, index: u64) -> u64 {
    match config.diminishing_after {
        Some(after) if index >= after => {
            let steps = (index - after) as f64;
            let decayed = config.base as f64 * decay_rate(config).powf(steps);
            decayed.floor() as u64
        }
        _ => config.base,
    }
}

/// A run of consecutive units that each yield the same XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRun {
    pub xp: u64,
    pub units: u64,
}

impl XpRun {
    pub fn total(&self) -> u64 {
        self.xp.saturating_mul(self.units)
    }
}

fn push_run(runs: &mut Vec<XpRun>, xp: u64, units: u64) {
    if units == 0 {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.xp == xp => last.units = last.units.saturating_add(units),
        _ => runs.push(XpRun { xp, units }),
    }
}

/// XP for a batch of `count` units after `prior` earlier units, as runs
/// of equal-valued units in unit order.
///
/// The result stays small for any `count`: full-value units form one run,
/// decayed units merge while their floored value repeats, and everything
/// after the first unit worth 0 is a single zero run.
///
/// # Examples
///
/// ```rust
/// use zzlevel::config::XpSourceConfig;
/// use zzlevel::xp::{xp_gain_breakdown, XpRun};
///
/// let mob = XpSourceConfig::diminishing(10, 1000, 0.8);
/// assert_eq!(
///     xp_gain_breakdown(&mob, 998, 4),
///     vec![XpRun { xp: 10, units: 3 }, XpRun { xp: 8, units: 1 }]
/// );
/// ```
pub fn xp_gain_breakdown(config: &XpSourceConfig, prior: u64, count: u64) -> Vec<XpRun> {
    let end = prior.saturating_add(count);
    let full_end = match config.diminishing_after {
        Some(after) if decay_rate(config) < 1.0 => after.clamp(prior, end),
        _ => end,
    };

    let mut runs = Vec::new();
    push_run(&mut runs, config.base, full_end - prior);

    for index in full_end..end {
        let xp = unit_xp(config, index);
        if xp == 0 {
            // the rate is below 1, so every later unit floors to 0 too
            push_run(&mut runs, 0, end - index);
            break;
        }
        push_run(&mut runs, xp, 1);
    }
    runs
}

/// Total XP for a batch of `count` units after `prior` earlier units.
///
/// # Examples
///
/// ```rust
/// use zzlevel::config::XpSourceConfig;
/// use zzlevel::xp::xp_gain;
///
/// let mob = XpSourceConfig::diminishing(10, 1000, 0.8);
/// assert_eq!(xp_gain(&mob, 0, 3), 30);
/// assert_eq!(xp_gain(&mob, 1000, 1), 10);
/// assert_eq!(xp_gain(&mob, 1001, 1), 8);
/// ```
pub fn xp_gain(config: &XpSourceConfig, prior: u64, count: u64) -> u64 {
    xp_gain_breakdown(config, prior, count)
        .iter()
        .fold(0u64, |total, run| total.saturating_add(run.total()))
}

/// Clamp a signed XP amount from an external caller to the valid range.
pub fn normalize_xp(raw: i64) -> u64 {
    if raw < 0 {
        log::warn!("negative XP amount {} treated as 0", raw);
        0
    } else {
        raw as u64
    }
}

/// Clamp a floating-point XP amount; NaN and negatives become 0.
pub fn normalize_xp_f64(raw: f64) -> u64 {
    if raw.is_nan() || raw < 0.0 {
        log::warn!("invalid XP amount {} treated as 0", raw);
        0
    } else {
        // `as` saturates at u64::MAX
        raw.floor() as u64
    }
}

/// XP source table keyed by activity.
#[derive(Debug, Clone, Default)]
pub struct XpSources {
    sources: BTreeMap<ActivitySource, XpSourceConfig>,
}

impl XpSources {
    pub fn new(sources: BTreeMap<ActivitySource, XpSourceConfig>) -> Self {
        Self { sources }
    }

    pub fn get(&self, source: &ActivitySource) -> Result<&XpSourceConfig, ProgressionError> {
        self.sources
            .get(source)
            .ok_or_else(|| ProgressionError::UnknownSource(source.clone()))
    }

    pub fn xp_gain(
        &self,
        source: &ActivitySource,
        prior: u64,
        count: u64,
    ) -> Result<u64, ProgressionError> {
        Ok(xp_gain(self.get(source)?, prior, count))
    }

    pub fn sources(&self) -> impl Iterator<Item = &ActivitySource> {
        self.sources.keys()
    }
}
