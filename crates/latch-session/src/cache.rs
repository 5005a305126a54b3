// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session-scoped permission cache.
//!
//! [`PermissionCache`] holds one [`PermissionSnapshot`] for the signed-in
//! session and answers capability checks synchronously from it. Loads are
//! asynchronous and guarded by an epoch counter so a slow response can
//! never overwrite the result of a newer load. Every load failure collapses
//! the cache to deny-all; a stale "allow" is the one answer this type must
//! never give.
//!
//! # Refresh Protocol
//!
//! 1. A refresh snapshots the session. A still-resolving session skips the
//!    load entirely.
//! 2. The epoch is bumped and remembered as this load's token, and the
//!    phase moves to `Loading`.
//! 3. The directory read runs without holding any lock.
//! 4. On completion the token is compared against the current epoch. A
//!    mismatch means a newer load (or a `clear`) happened meanwhile; the
//!    result is discarded untouched.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use latch_directory::MemoryDirectory;
//! use latch_session::{PermissionCache, StaticSessionProvider};
//!
//! # async fn example() {
//! let provider = Arc::new(StaticSessionProvider::anonymous());
//! let directory = Arc::new(MemoryDirectory::new());
//! let cache = PermissionCache::new(provider, directory, "ADMIN");
//!
//! cache.refresh().await;
//! assert!(!cache.can_view("rooms"));
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use latch_core::error::DirectoryError;
use latch_core::types::{ActionKey, RoleCode};
use latch_directory::PermissionDirectory;

use crate::provider::SessionProvider;
use crate::snapshot::PermissionSnapshot;

// ============================================================================
// Cache Phase
// ============================================================================

/// Lifecycle phase of the cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePhase {
    /// Nothing has been loaded yet.
    Empty,
    /// A load is in flight; checks answer from the previous snapshot.
    Loading,
    /// The snapshot reflects a completed load.
    Ready,
    /// The last load failed; the snapshot is deny-all.
    Failed,
}

impl CachePhase {
    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePhase::Empty => "empty",
            CachePhase::Loading => "loading",
            CachePhase::Ready => "ready",
            CachePhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CachePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Refresh Outcome
// ============================================================================

/// What a call to [`PermissionCache::refresh`] actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fresh snapshot was committed.
    Loaded,
    /// The session is still resolving; the cache was left untouched.
    SessionResolving,
    /// A newer load or a clear superseded this one; its result was dropped.
    Superseded,
    /// The load failed; the cache is now deny-all.
    FailedClosed,
}

// ============================================================================
// Cache State
// ============================================================================

#[derive(Debug)]
struct CacheState {
    snapshot: PermissionSnapshot,
    phase: CachePhase,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
    epoch: u64,
}

impl CacheState {
    fn new() -> Self {
        Self {
            snapshot: PermissionSnapshot::empty(),
            phase: CachePhase::Empty,
            last_updated: None,
            last_error: None,
            epoch: 0,
        }
    }
}

// ============================================================================
// Cache Statistics
// ============================================================================

/// Internal cache statistics with atomic counters.
#[derive(Debug, Default)]
pub struct CacheStatsInner {
    /// Snapshots committed
    pub loads: AtomicU64,
    /// Loads that failed and collapsed the cache to deny-all
    pub fail_closed_loads: AtomicU64,
    /// Load results discarded because a newer load superseded them
    pub superseded_loads: AtomicU64,
    /// Refreshes skipped because the session was still resolving
    pub skipped_resolving: AtomicU64,
    /// Capability checks answered
    pub queries: AtomicU64,
    /// Checks answered `true` through the admin bypass
    pub admin_bypasses: AtomicU64,
}

impl CacheStatsInner {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot of current statistics
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            fail_closed_loads: self.fail_closed_loads.load(Ordering::Relaxed),
            superseded_loads: self.superseded_loads.load(Ordering::Relaxed),
            skipped_resolving: self.skipped_resolving.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            admin_bypasses: self.admin_bypasses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of cache statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Snapshots committed
    pub loads: u64,
    /// Loads that collapsed the cache to deny-all
    pub fail_closed_loads: u64,
    /// Load results discarded as stale
    pub superseded_loads: u64,
    /// Refreshes skipped while the session resolved
    pub skipped_resolving: u64,
    /// Capability checks answered
    pub queries: u64,
    /// Checks answered through the admin bypass
    pub admin_bypasses: u64,
}

// ============================================================================
// Permission Cache
// ============================================================================

/// The session permission cache.
///
/// Shared across the console as an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct PermissionCache {
    /// Source of the current session.
    provider: Arc<dyn SessionProvider>,

    /// Backend the snapshot is loaded from.
    directory: Arc<dyn PermissionDirectory>,

    /// Role code that short-circuits every check to `true`.
    admin_role_code: RoleCode,

    /// Guarded snapshot and phase.
    state: RwLock<CacheState>,

    /// Operation counters.
    stats: CacheStatsInner,
}

impl PermissionCache {
    /// Creates a cache over the given session provider and directory.
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        directory: Arc<dyn PermissionDirectory>,
        admin_role_code: impl Into<RoleCode>,
    ) -> Self {
        Self {
            provider,
            directory,
            admin_role_code: admin_role_code.into(),
            state: RwLock::new(CacheState::new()),
            stats: CacheStatsInner::new(),
        }
    }

    /// Loads the session's permissions into the cache.
    ///
    /// Safe to call concurrently; only the newest call's result is kept.
    pub async fn refresh(&self) -> RefreshOutcome {
        let session = self.provider.state();

        if session.resolving {
            debug!("Session still resolving, skipping permission load");
            self.stats.skipped_resolving.fetch_add(1, Ordering::Relaxed);
            return RefreshOutcome::SessionResolving;
        }

        let token = {
            let mut state = self.state.write();
            state.epoch += 1;
            state.phase = CachePhase::Loading;
            state.epoch
        };

        // The admin bypass is decided by the session role alone; the
        // directory is not consulted.
        if session.role_code() == Some(&self.admin_role_code) {
            return self.commit(token, Ok(PermissionSnapshot::admin()));
        }

        let result = self
            .directory
            .role_permissions(session.role_id())
            .await
            .map(|rows| PermissionSnapshot::from_grants(&rows));

        self.commit(token, result)
    }

    fn commit(
        &self,
        token: u64,
        result: Result<PermissionSnapshot, DirectoryError>,
    ) -> RefreshOutcome {
        let mut state = self.state.write();
        if state.epoch != token {
            debug!(
                token,
                epoch = state.epoch,
                "Discarding superseded permission load"
            );
            self.stats.superseded_loads.fetch_add(1, Ordering::Relaxed);
            return RefreshOutcome::Superseded;
        }

        state.last_updated = Some(Utc::now());
        match result {
            Ok(snapshot) => {
                info!(
                    admin = snapshot.is_admin(),
                    modules = snapshot.module_count(),
                    "Permission snapshot loaded"
                );
                state.snapshot = snapshot;
                state.phase = CachePhase::Ready;
                state.last_error = None;
                self.stats.loads.fetch_add(1, Ordering::Relaxed);
                RefreshOutcome::Loaded
            }
            Err(e) => {
                warn!(error = %e, "Permission load failed, denying all");
                state.snapshot = PermissionSnapshot::empty();
                state.phase = CachePhase::Failed;
                state.last_error = Some(e.to_string());
                self.stats.fail_closed_loads.fetch_add(1, Ordering::Relaxed);
                RefreshOutcome::FailedClosed
            }
        }
    }

    /// Drops the snapshot and returns to the empty phase.
    ///
    /// Also invalidates any load still in flight.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.epoch += 1;
        state.snapshot = PermissionSnapshot::empty();
        state.phase = CachePhase::Empty;
        state.last_updated = None;
        state.last_error = None;
        debug!("Permission cache cleared");
    }

    /// Answers one capability check.
    ///
    /// An admin session answers `true` regardless of cache phase; everyone
    /// else answers from the current snapshot, which denies everything
    /// until a load completes. The admin bypass deliberately consults the
    /// live session role rather than the snapshot, so an admin is never
    /// locked out by a refresh that has not landed yet (or failed closed).
    pub fn can_perform(&self, module: &str, action: ActionKey) -> bool {
        self.stats.queries.fetch_add(1, Ordering::Relaxed);

        if module.is_empty() {
            return false;
        }
        if self.provider.state().role_code() == Some(&self.admin_role_code) {
            self.stats.admin_bypasses.fetch_add(1, Ordering::Relaxed);
            return true;
        }

        self.state.read().snapshot.allows(module, action)
    }

    /// Capability check for the default `view` action.
    #[inline]
    pub fn can_view(&self, module: &str) -> bool {
        self.can_perform(module, ActionKey::View)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> PermissionSnapshot {
        self.state.read().snapshot.clone()
    }

    /// The current phase.
    pub fn phase(&self) -> CachePhase {
        self.state.read().phase
    }

    /// Returns `true` while a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase() == CachePhase::Loading
    }

    /// Returns `true` once a load has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.phase() == CachePhase::Ready
    }

    /// When the last load attempt completed, if any.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_updated
    }

    /// The last load failure, if the most recent load failed.
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// The current load epoch.
    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }

    /// The configured admin role code.
    pub fn admin_role_code(&self) -> &RoleCode {
        &self.admin_role_code
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

// ============================================================================
// Tests
// ============================================================================
