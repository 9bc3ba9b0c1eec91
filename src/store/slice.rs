// src/store/slice.rs
//! Keyed, optionally expiring snapshots of store state

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::app_log;
use crate::core::StateMedium;
use crate::store::clock::{Clock, SystemClock};

/// State that knows which of its fields survive a restart under a given
/// snapshot shape. One state may be persisted under several shapes.
pub trait Persisted<S> {
    fn snapshot(&self) -> S;
    fn restore(&mut self, snapshot: S);
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    data: &'a T,
    timestamp: i64,
}

#[derive(Deserialize)]
struct Snapshot<T> {
    data: T,
    timestamp: i64,
}

/// Stored as `{"data": ..., "timestamp": <epoch ms>}` under a fixed key.
///
/// Reads never fail: a missing, corrupt or expired entry is a miss, and the
/// latter two are deleted on the way out. Writes log failures and move on.
pub struct PersistedSlice<T> {
    key: String,
    ttl: Option<Duration>,
    medium: StateMedium,
    clock: Arc<dyn Clock>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for PersistedSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSlice")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<T> PersistedSlice<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>, medium: StateMedium) -> Self {
        Self {
            key: key.into(),
            ttl: None,
            medium,
            clock: Arc::new(SystemClock),
            _marker: PhantomData,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self) -> Option<T> {
        let raw = match self.medium.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                app_log!(warn, "Failed to read {}: {:#}", self.key, e);
                return None;
            }
        };

        let snapshot: Snapshot<T> = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                app_log!(warn, "Discarding unreadable snapshot {}: {}", self.key, e);
                self.clear().await;
                return None;
            }
        };

        if let Some(ttl) = self.ttl {
            let age = self.clock.now_millis() - snapshot.timestamp;
            if age > ttl.num_milliseconds() {
                app_log!(debug, "Snapshot {} expired ({} ms old)", self.key, age);
                self.clear().await;
                return None;
            }
        }

        Some(snapshot.data)
    }

    pub async fn save(&self, data: &T) {
        let snapshot = SnapshotRef {
            data,
            timestamp: self.clock.now_millis(),
        };

        let raw = match serde_json::to_string(&snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                app_log!(error, "Failed to serialize {}: {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.medium.put(&self.key, &raw).await {
            app_log!(error, "Failed to persist {}: {:#}", self.key, e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.medium.remove(&self.key).await {
            app_log!(warn, "Failed to remove {}: {:#}", self.key, e);
        }
    }

    pub async fn save_state<S>(&self, state: &S)
    where
        S: Persisted<T>,
    {
        self.save(&state.snapshot()).await;
    }

    /// Restore `state` from the stored snapshot; returns whether one existed
    pub async fn load_into<S>(&self, state: &mut S) -> bool
    where
        S: Persisted<T>,
    {
        match self.load().await {
            Some(snapshot) => {
                state.restore(snapshot);
                true
            }
            None => false,
        }
    }
}
