//! Error types for progression operations.
//!
//! Every failure a player operation can produce is an expected outcome of
//! normal play ("not enough XP" happens constantly), so all of them are
//! returned as `ProgressionError` values. Configuration problems are
//! reported separately as `ConfigError` and surface once, when the engine
//! is built.

use crate::ids::{ActivitySource, SkillKey};
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[SkillKey]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Coarse classification of a `ProgressionError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request that could not be normalized.
    InvalidInput,
    /// Unknown skill, tree, activity source or player.
    NotFound,
    /// A game rule refused the operation.
    PreconditionFailed,
}

/// Errors returned by engine operations.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{ErrorKind, ProgressionError};
///
/// let err = ProgressionError::InsufficientXp { required: 3000, available: 1200 };
/// assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
/// assert!(err.to_string().contains("3000"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProgressionError {
    /// The request could not be interpreted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The skill or its tree does not exist.
    #[error("Skill not found: {0}")]
    SkillNotFound(SkillKey),

    /// The activity source has no XP configuration.
    #[error("Unknown XP source: {0}")]
    UnknownSource(ActivitySource),

    /// No stored progress for the requested player.
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    /// The skill is already at its maximum level.
    #[error("Skill {skill} already at max level {max_level}")]
    MaxLevelReached { skill: SkillKey, max_level: u32 },

    /// A prerequisite skill is below its required level.
    #[error("Prerequisite not met for {skill}: {detail}")]
    PrerequisiteNotMet { skill: SkillKey, detail: String },

    /// Cumulative XP is below the skill's next-level cost.
    #[error("Insufficient XP: requires {required}, have {available}")]
    InsufficientXp { required: u64, available: u64 },

    /// The player is already at the last prestige tier.
    #[error("Maximum prestige {0} reached")]
    MaxPrestigeReached(u32),

    /// One or more prestige requirements are unmet.
    #[error("Cannot prestige: {}", .reasons.join("; "))]
    PrestigeUnavailable { reasons: Vec<String> },
}

impl ProgressionError {
    /// Classify this error into the coarse taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProgressionError::InvalidInput(_) => ErrorKind::InvalidInput,
            ProgressionError::SkillNotFound(_)
            | ProgressionError::UnknownSource(_)
            | ProgressionError::PlayerNotFound(_) => ErrorKind::NotFound,
            ProgressionError::MaxLevelReached { .. }
            | ProgressionError::PrerequisiteNotMet { .. }
            | ProgressionError::InsufficientXp { .. }
            | ProgressionError::MaxPrestigeReached(_)
            | ProgressionError::PrestigeUnavailable { .. } => ErrorKind::PreconditionFailed,
        }
    }
}

/// Errors raised while loading or validating an `EngineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration document could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A numeric level-curve parameter is out of range.
    #[error("Invalid level curve: {0}")]
    InvalidCurve(String),

    /// A prerequisite expression is malformed.
    #[error("Malformed prerequisite {expr:?} on {skill}: {reason}")]
    MalformedPrerequisite {
        skill: SkillKey,
        expr: String,
        reason: String,
    },

    /// A prerequisite names a skill that is not configured.
    #[error("Prerequisite of {skill} references unknown skill {target}")]
    UnknownPrerequisite { skill: SkillKey, target: SkillKey },

    /// Prerequisites form a cycle.
    #[error("Prerequisite cycle detected: {}", format_cycle_path(.path))]
    PrerequisiteCycle { path: Vec<SkillKey> },

    /// The rank tiers do not partition the level space.
    #[error("Invalid rank tiers: {0}")]
    InvalidRankTiers(String),

    /// Any other inconsistent table.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
