use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Reference lists are refetched after one hour.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Source of "now"; injectable so expiry can be tested.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Single-slot, time-boxed cache for the vehicle reference list.
pub trait ReferenceCache: Send + Sync {
    /// Cached list, or `None` when absent, expired or unreadable.
    fn get(&self) -> Option<Vec<String>>;
    /// Stores `list` stamped with the current time, replacing any prior entry.
    fn set(&self, list: &[String]);
    fn clear(&self);
    fn is_valid(&self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    vehicles: Vec<String>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stored_at < ttl
    }
}

pub struct MemoryReferenceCache {
    slot: Mutex<Option<CacheEntry>>,
    ttl: Duration,
    clock: Clock,
}

impl MemoryReferenceCache {
    pub fn new() -> Self {
        Self::with_clock(Duration::seconds(DEFAULT_TTL_SECS), system_clock())
    }

    pub fn with_clock(ttl: Duration, clock: Clock) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            clock,
        }
    }

    fn fresh_entry(&self) -> Option<CacheEntry> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|entry| entry.is_fresh((self.clock)(), self.ttl))
            .cloned()
    }
}

impl Default for MemoryReferenceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceCache for MemoryReferenceCache {
    fn get(&self) -> Option<Vec<String>> {
        self.fresh_entry().map(|entry| entry.vehicles)
    }

    fn set(&self, list: &[String]) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CacheEntry {
            stored_at: (self.clock)(),
            vehicles: list.to_vec(),
        });
    }

    fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    fn is_valid(&self) -> bool {
        self.fresh_entry().is_some()
    }
}

/// Persists the slot as one JSON file, so the list survives restarts.
pub struct FileReferenceCache {
    path: PathBuf,
    ttl: Duration,
    clock: Clock,
}

impl FileReferenceCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Duration::seconds(DEFAULT_TTL_SECS), system_clock())
    }

    pub fn with_clock(path: impl Into<PathBuf>, ttl: Duration, clock: Clock) -> Self {
        Self {
            path: path.into(),
            ttl,
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the slot. Corrupt content is removed and reported as a miss.
    fn load(&self) -> Option<CacheEntry> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Reference cache unreadable: path={:?}, error={}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    "Discarding corrupt reference cache: path={:?}, error={}",
                    self.path,
                    e
                );
                self.clear();
                None
            }
        }
    }

    fn fresh_entry(&self) -> Option<CacheEntry> {
        self.load()
            .filter(|entry| entry.is_fresh((self.clock)(), self.ttl))
    }
}

impl ReferenceCache for FileReferenceCache {
    fn get(&self) -> Option<Vec<String>> {
        self.fresh_entry().map(|entry| entry.vehicles)
    }

    fn set(&self, list: &[String]) {
        let entry = CacheEntry {
            stored_at: (self.clock)(),
            vehicles: list.to_vec(),
        };
        let result = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&self.path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!("Failed to write reference cache: path={:?}, error={}", self.path, e);
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to clear reference cache: path={:?}, error={}",
                    self.path,
                    e
                );
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.fresh_entry().is_some()
    }
}
