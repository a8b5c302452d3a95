//! Identifier module.
//!
//! Provides the interned identifier types used across the engine:
//! skill trees, skills, achievements and XP activity sources. All of
//! them wrap an `Arc<str>` so cloning a configuration key is cheap and
//! comparison stays a string comparison.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create a new identifier from a string slice.
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Self {
                Self(Arc::from(s))
            }

            /// Get the string representation of this identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.0.as_ref().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_str(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

interned_id!(
    /// Identifier of a skill tree (e.g. `COMBAT`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::TreeId;
    ///
    /// let combat = TreeId::from_str("COMBAT");
    /// let same: TreeId = "COMBAT".into();
    /// assert_eq!(combat, same);
    /// assert_eq!(combat.as_str(), "COMBAT");
    /// ```
    TreeId
);

interned_id!(
    /// Identifier of a skill, unique within its tree.
    SkillId
);

interned_id!(
    /// Identifier of an achievement. Achievements gate levels and count
    /// toward prestige requirements.
    AchievementId
);

interned_id!(
    /// Identifier of an XP-yielding activity (e.g. `MOB_COMMON`).
    ActivitySource
);

/// Fully qualified skill address: the tree plus the skill inside it.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillKey {
    pub tree: TreeId,
    pub skill: SkillId,
}

impl SkillKey {
    pub fn new(tree: impl Into<TreeId>, skill: impl Into<SkillId>) -> Self {
        Self {
            tree: tree.into(),
            skill: skill.into(),
        }
    }
}

impl std::fmt::Display for SkillKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.tree, self.skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_creation() {
        let id1 = SkillId::from_str("STRENGTH");
        let id2 = SkillId::from_str("STRENGTH");
        assert_eq!(id1, id2);
        assert_eq!(id1.as_str(), "STRENGTH");
    }

    #[test]
    fn test_id_from_string() {
        let id: AchievementId = String::from("FIRST_BLOOD").into();
        assert_eq!(id.as_str(), "FIRST_BLOOD");
    }

    #[test]
    fn test_id_serde_is_plain_string() {
        let id = ActivitySource::from_str("MOB_COMMON");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"MOB_COMMON\"");

        let back: ActivitySource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_borrow_lookup() {
        let mut held = HashSet::new();
        held.insert(AchievementId::from_str("DUNGEON_CLEAR"));
        assert!(held.contains("DUNGEON_CLEAR"));
    }

    #[test]
    fn test_skill_key_display() {
        let key = SkillKey::new("COMBAT", "CRITICAL_HIT");
        assert_eq!(key.to_string(), "COMBAT.CRITICAL_HIT");
    }
}
