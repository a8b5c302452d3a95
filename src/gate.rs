//! Achievement gates.
//!
//! Some levels require an achievement before they become usable. Gates
//! never hold back XP; they cap the level a player can use until the
//! missing achievement is unlocked, at which point the same XP resolves
//! to the higher level.

use crate::ids::AchievementId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Whether a level is usable for a given achievement set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Unlocked(u32),
    Locked {
        level: u32,
        required_achievement: AchievementId,
    },
}

/// A gated level the player does not yet qualify for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingGate {
    pub level: u32,
    pub required_achievement: AchievementId,
}

/// Result of scanning a range of levels for gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateScan {
    /// Highest usable level.
    pub capped_level: u32,
    /// Every unmet gate in the scanned range, ascending.
    pub blocking: Vec<BlockingGate>,
}

/// Level -> required achievement mapping.
///
/// # Examples
///
/// ```rust
/// use std::collections::{BTreeMap, BTreeSet};
/// use zzlevel::{AchievementId, LevelGates};
///
/// let mut gates = BTreeMap::new();
/// gates.insert(10, AchievementId::from_str("FIRST_DUNGEON"));
/// let gates = LevelGates::new(gates);
///
/// let none = BTreeSet::new();
/// assert_eq!(gates.effective_level(25, &none), 9);
///
/// let held: BTreeSet<_> = [AchievementId::from_str("FIRST_DUNGEON")].into();
/// assert_eq!(gates.effective_level(25, &held), 25);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelGates {
    gates: BTreeMap<u32, AchievementId>,
}

impl LevelGates {
    pub fn new(gates: BTreeMap<u32, AchievementId>) -> Self {
        Self { gates }
    }

    pub fn gate_for(&self, level: u32) -> Option<&AchievementId> {
        self.gates.get(&level)
    }

    pub fn state(&self, level: u32, achievements: &BTreeSet<AchievementId>) -> GateState {
        match self.gates.get(&level) {
            Some(required) if !achievements.contains(required) => GateState::Locked {
                level,
                required_achievement: required.clone(),
            },
            _ => GateState::Unlocked(level),
        }
    }

    /// Unmet gates in `(from_exclusive, to_inclusive]`, ascending.
    pub fn blocking_gates(
        &self,
        from_exclusive: u32,
        to_inclusive: u32,
        achievements: &BTreeSet<AchievementId>,
    ) -> Vec<BlockingGate> {
        if to_inclusive <= from_exclusive {
            return Vec::new();
        }
        self.gates
            .range(from_exclusive + 1..=to_inclusive)
            .filter(|(_, required)| !achievements.contains(*required))
            .map(|(&level, required)| BlockingGate {
                level,
                required_achievement: required.clone(),
            })
            .collect()
    }

    /// Scan levels above `from_level` up to `raw_level`; the first unmet
    /// gate caps the result one level below it.
    pub fn scan(
        &self,
        from_level: u32,
        raw_level: u32,
        achievements: &BTreeSet<AchievementId>,
    ) -> GateScan {
        let blocking = self.blocking_gates(from_level, raw_level, achievements);
        let capped_level = match blocking.first() {
            Some(gate) => gate.level - 1,
            None => raw_level,
        };
        GateScan {
            capped_level,
            blocking,
        }
    }

    /// Usable level for a player whose XP reaches `raw_level`.
    pub fn effective_level(&self, raw_level: u32, achievements: &BTreeSet<AchievementId>) -> u32 {
        self.scan(0, raw_level, achievements).capped_level.max(1)
    }

    /// First unmet gate at or below `raw_level`, if any.
    pub fn first_blocker(
        &self,
        raw_level: u32,
        achievements: &BTreeSet<AchievementId>,
    ) -> Option<BlockingGate> {
        self.blocking_gates(0, raw_level, achievements)
            .into_iter()
            .next()
    }

    /// Levels gated on `achievement`, ascending.
    pub fn levels_requiring(&self, achievement: &AchievementId) -> Vec<u32> {
        self.gates
            .iter()
            .filter(|(_, required)| *required == achievement)
            .map(|(&level, _)| level)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AchievementId)> {
        self.gates.iter().map(|(&level, id)| (level, id))
    }
}
