//! Per-session storage of availability searches.

use super::reducer::{AvailabilitySearch, SearchEvent};
use crate::upstream::AvailabilityQuery;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A session key derived from the client's session token.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionKey(String);

impl SessionKey {
    /// Creates a session key from the raw token.
    ///
    /// The token is hashed so it is never stored or logged as sent.
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let result = hasher.finalize();
        // 32 hex chars
        let hash = hex::encode(&result[..16]);
        Self(hash)
    }

    /// Returns the internal hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Default lifetime of an idle session's search.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Reason recorded for buildings still pending when a search is abandoned.
pub const ABANDONED_REASON: &str = "search was cancelled before this building answered";

struct SessionEntry {
    search: AvailabilitySearch,
    /// Last time the search was started or updated
    touched_at: Instant,
}

/// The latest availability search of every session.
///
/// Each session only ever sees the outcome of its own latest search.
/// Entries idle for longer than the TTL are dropped.
pub struct SearchSessions {
    sessions: DashMap<SessionKey, SessionEntry>,
    last_generation: AtomicU64,
    ttl: Duration,
}

impl Default for SearchSessions {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SearchSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            last_generation: AtomicU64::new(0),
            ttl,
        }
    }

    /// Hands out a generation no other search has used.
    pub fn next_generation(&self) -> u64 {
        self.last_generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Starts a new search for the session and returns its generation.
    ///
    /// Any response still in flight for an older search of the same
    /// session will be dropped when it arrives.
    pub fn begin(&self, key: &SessionKey, query: AvailabilityQuery, buildings: Vec<String>) -> u64 {
        self.cleanup_expired();

        let generation = self.next_generation();
        self.apply(
            key,
            SearchEvent::Started {
                generation,
                query,
                buildings,
            },
        );
        generation
    }

    /// Folds one event into the session's search.
    pub fn apply(&self, key: &SessionKey, event: SearchEvent) {
        let mut entry = self
            .sessions
            .entry(key.clone())
            .or_insert_with(|| SessionEntry {
                search: AvailabilitySearch::default(),
                touched_at: Instant::now(),
            });
        let current = std::mem::take(&mut entry.search);
        entry.search = current.apply(event);
        entry.touched_at = Instant::now();
    }

    /// Marks every building still pending in `generation` as failed.
    ///
    /// Does nothing if the session has moved on to a newer search.
    pub fn abandon(&self, key: &SessionKey, generation: u64) {
        let Some(mut entry) = self.sessions.get_mut(key) else {
            return;
        };
        if entry.search.generation() != generation {
            return;
        }

        let pending: Vec<String> = entry.search.pending_buildings().map(String::from).collect();
        if pending.is_empty() {
            return;
        }
        warn!(
            session = %key,
            generation,
            pending = pending.len(),
            "Availability search abandoned"
        );

        let mut search = std::mem::take(&mut entry.search);
        for building in pending {
            search = search.apply(SearchEvent::BuildingFailed {
                generation,
                building,
                reason: ABANDONED_REASON.to_string(),
            });
        }
        entry.search = search;
        entry.touched_at = Instant::now();
    }

    /// Copy of the session's current search, unless it never searched or expired.
    pub fn snapshot(&self, key: &SessionKey) -> Option<AvailabilitySearch> {
        let entry = self.sessions.get(key)?;
        if entry.touched_at.elapsed() < self.ttl {
            return Some(entry.search.clone());
        }

        drop(entry);
        self.sessions.remove(key);
        debug!(session = %key, "Session search expired");
        None
    }

    /// Removes every expired session.
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.sessions
            .retain(|_, entry| entry.touched_at.elapsed() < ttl);
    }

    /// Number of stored sessions, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Abandons a session's search if dropped before [`SearchGuard::complete`].
///
/// Held across the fan-out so a cancelled request never leaves the
/// session stuck in `Loading`.
pub struct SearchGuard<'a> {
    sessions: &'a SearchSessions,
    key: &'a SessionKey,
    generation: u64,
    done: bool,
}

impl<'a> SearchGuard<'a> {
    pub fn new(sessions: &'a SearchSessions, key: &'a SessionKey, generation: u64) -> Self {
        Self {
            sessions,
            key,
            generation,
            done: false,
        }
    }

    /// The fan-out finished; every building has reported.
    pub fn complete(mut self) {
        self.done = true;
    }
}

impl Drop for SearchGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.sessions.abandon(self.key, self.generation);
        }
    }
}
