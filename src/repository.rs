//! Origin, path-profile and thread storage.
//!
//! The [`Repository`] trait is the record-level interface discovery and
//! harvesting write through. [`MemoryRepository`] keeps everything in memory
//! and can snapshot itself to a JSON file between runs.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{NewOrigin, Origin, OriginCategory, OriginId, PathProfile, ThreadRecord};

/// How to change an origin's dead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadScore {
    /// Add to the current score.
    Raise(i64),
    /// Replace the current score.
    Set(i64),
}

/// Persistent store for origins, their path profiles and harvested threads.
pub trait Repository {
    /// Origin of `category` stored under `domain`.
    fn find_origin(&self, category: OriginCategory, domain: &str) -> Result<Option<Origin>>;

    /// Store a new origin with a dead score of zero.
    fn insert_origin(&self, origin: NewOrigin) -> Result<OriginId>;

    /// Store `profile` for its origin, replacing any existing profile.
    fn insert_path(&self, profile: PathProfile) -> Result<()>;

    /// Replace the existing profile of `profile`'s origin. Fails when the
    /// origin has none.
    fn update_path(&self, profile: PathProfile) -> Result<()>;

    /// Profile of `origin_id`.
    fn get_path(&self, origin_id: OriginId) -> Result<Option<PathProfile>>;

    /// Every origin of `category`, in id order.
    fn origins_by_category(&self, category: OriginCategory) -> Result<Vec<Origin>>;

    /// Remember the newest thread seen on `origin_id`.
    fn update_last_url(&self, origin_id: OriginId, url: &str) -> Result<()>;

    /// Adjust the dead score of `origin_id` and return the new value.
    fn adjust_dead_score(&self, origin_id: OriginId, change: DeadScore) -> Result<i64>;

    /// Record that a harvest refreshed `origin_id` at `at`.
    fn mark_refreshed(&self, origin_id: OriginId, at: NaiveDateTime) -> Result<()>;

    /// Whether a thread with this URL is already stored.
    fn thread_exists(&self, url: &str) -> Result<bool>;

    /// Store a harvested thread.
    fn insert_thread(&self, thread: ThreadRecord) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Store {
    next_id: u64,
    origins: Vec<Origin>,
    paths: Vec<PathProfile>,
    threads: Vec<ThreadRecord>,
}

impl Store {
    fn origin_mut(&mut self, origin_id: OriginId) -> Result<&mut Origin> {
        self.origins
            .iter_mut()
            .find(|o| o.id == origin_id)
            .ok_or_else(|| Error::Repository(format!("unknown origin {origin_id}")))
    }

    fn path_index(&self, origin_id: OriginId) -> Option<usize> {
        self.paths.iter().position(|p| p.origin_id == Some(origin_id))
    }
}

/// In-memory [`Repository`] with JSON snapshots.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    store: Mutex<Store>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot written by [`MemoryRepository::save`]. A missing file
    /// gives an empty repository.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no store snapshot, starting empty");
            return Ok(Self::new());
        }

        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Repository(format!("reading {}: {e}", path.display())))?;
        let store: Store = serde_json::from_str(&raw)
            .map_err(|e| Error::Repository(format!("parsing {}: {e}", path.display())))?;
        Ok(Self {
            store: Mutex::new(store),
        })
    }

    /// Write the whole store to `path` as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = {
            let store = self.lock()?;
            serde_json::to_string_pretty(&*store)
                .map_err(|e| Error::Repository(format!("serializing store: {e}")))?
        };
        fs::write(path, json).map_err(|e| Error::Repository(format!("writing {}: {e}", path.display())))
    }

    /// Every stored thread, in insertion order.
    pub fn threads(&self) -> Result<Vec<ThreadRecord>> {
        Ok(self.lock()?.threads.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| Error::Repository("store lock poisoned".to_string()))
    }
}

impl Repository for MemoryRepository {
    fn find_origin(&self, category: OriginCategory, domain: &str) -> Result<Option<Origin>> {
        let store = self.lock()?;
        Ok(store
            .origins
            .iter()
            .find(|o| o.category == category && o.domain == domain)
            .cloned())
    }

    fn insert_origin(&self, origin: NewOrigin) -> Result<OriginId> {
        let mut store = self.lock()?;
        store.next_id += 1;
        let id = OriginId(store.next_id);
        store.origins.push(Origin {
            id,
            domain: origin.domain,
            category: origin.category,
            dead_score: 0,
            last_checked_url: None,
            last_refreshed: None,
        });
        Ok(id)
    }

    fn insert_path(&self, profile: PathProfile) -> Result<()> {
        let origin_id = profile
            .origin_id
            .ok_or_else(|| Error::Repository("path profile has no origin".to_string()))?;
        let mut store = self.lock()?;
        store.origin_mut(origin_id)?;

        match store.path_index(origin_id) {
            Some(i) => store.paths[i] = profile,
            None => store.paths.push(profile),
        }
        Ok(())
    }

    fn update_path(&self, profile: PathProfile) -> Result<()> {
        let origin_id = profile
            .origin_id
            .ok_or_else(|| Error::Repository("path profile has no origin".to_string()))?;
        let mut store = self.lock()?;

        let i = store
            .path_index(origin_id)
            .ok_or_else(|| Error::Repository(format!("origin {origin_id} has no path profile")))?;
        store.paths[i] = profile;
        Ok(())
    }

    fn get_path(&self, origin_id: OriginId) -> Result<Option<PathProfile>> {
        let store = self.lock()?;
        Ok(store.path_index(origin_id).map(|i| store.paths[i].clone()))
    }

    fn origins_by_category(&self, category: OriginCategory) -> Result<Vec<Origin>> {
        let store = self.lock()?;
        let mut origins: Vec<Origin> = store
            .origins
            .iter()
            .filter(|o| o.category == category)
            .cloned()
            .collect();
        origins.sort_by_key(|o| o.id);
        Ok(origins)
    }

    fn update_last_url(&self, origin_id: OriginId, url: &str) -> Result<()> {
        let mut store = self.lock()?;
        store.origin_mut(origin_id)?.last_checked_url = Some(url.to_string());
        Ok(())
    }

    fn adjust_dead_score(&self, origin_id: OriginId, change: DeadScore) -> Result<i64> {
        let mut store = self.lock()?;
        let origin = store.origin_mut(origin_id)?;
        origin.dead_score = match change {
            DeadScore::Raise(n) => origin.dead_score + n,
            DeadScore::Set(n) => n,
        };
        Ok(origin.dead_score)
    }

    fn mark_refreshed(&self, origin_id: OriginId, at: NaiveDateTime) -> Result<()> {
        let mut store = self.lock()?;
        store.origin_mut(origin_id)?.last_refreshed = Some(at);
        Ok(())
    }

    fn thread_exists(&self, url: &str) -> Result<bool> {
        Ok(self.lock()?.threads.iter().any(|t| t.url == url))
    }

    fn insert_thread(&self, thread: ThreadRecord) -> Result<()> {
        self.lock()?.threads.push(thread);
        Ok(())
    }
}
