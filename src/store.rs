//! Persistence boundary.
//!
//! The engine only works on a `PlayerProgress` value; loading and saving it
//! belongs to the host. `ProgressStore` is that seam. Every engine
//! operation is a read-modify-write, so writes for one player must not
//! overlap: `PlayerLocks::with_player` serialises them per player id while
//! leaving different players independent.

use crate::error::ProgressionError;
use crate::progress::PlayerProgress;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Durable storage for player progress.
pub trait ProgressStore: Send + Sync {
    fn load(&self, player: &str) -> Option<PlayerProgress>;
    fn save(&self, player: &str, progress: PlayerProgress);
}

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    players: Mutex<HashMap<String, PlayerProgress>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a player record.
    pub fn insert(&self, player: impl Into<String>, progress: PlayerProgress) {
        self.players.lock().insert(player.into(), progress);
    }

    pub fn len(&self) -> usize {
        self.players.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.lock().is_empty()
    }
}

impl ProgressStore for InMemoryStore {
    fn load(&self, player: &str) -> Option<PlayerProgress> {
        self.players.lock().get(player).cloned()
    }

    fn save(&self, player: &str, progress: PlayerProgress) {
        self.players.lock().insert(player.to_string(), progress);
    }
}

/// One mutex per player id.
///
/// # Examples
///
/// ```rust
/// use zzlevel::store::{InMemoryStore, PlayerLocks, ProgressStore};
/// use zzlevel::PlayerProgress;
///
/// let store = InMemoryStore::new();
/// store.insert("sung", PlayerProgress::new());
///
/// let locks = PlayerLocks::new();
/// locks
///     .with_player(&store, "sung", |progress| {
///         progress.total_xp += 100;
///         Ok(())
///     })
///     .unwrap();
///
/// assert_eq!(store.load("sung").unwrap().total_xp, 100);
/// ```
#[derive(Debug, Default)]
pub struct PlayerLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, player: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(player.to_string()).or_default())
    }

    /// Load, mutate and save one player's progress under that player's lock.
    ///
    /// The record is saved only when `f` returns `Ok`; on error the stored
    /// progress is left untouched.
    pub fn with_player<S, F, R>(&self, store: &S, player: &str, f: F) -> Result<R, ProgressionError>
    where
        S: ProgressStore + ?Sized,
        F: FnOnce(&mut PlayerProgress) -> Result<R, ProgressionError>,
    {
        let lock = self.lock_for(player);
        let _guard = lock.lock();

        let mut progress = store
            .load(player)
            .ok_or_else(|| ProgressionError::PlayerNotFound(player.to_string()))?;
        let result = f(&mut progress)?;
        store.save(player, progress);
        Ok(result)
    }

    /// Number of players that have been locked at least once.
    pub fn tracked_players(&self) -> usize {
        self.locks.lock().len()
    }
}
