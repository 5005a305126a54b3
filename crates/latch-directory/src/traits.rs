// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core directory abstractions shared by every backend implementation.
//!
//! This module defines the [`PermissionDirectory`] trait together with its
//! configuration and statistics types. Implementations provide access to the
//! module/action catalog and to per-role grant sets; consumers (the session
//! cache, the matrix editor, the CLI) only ever talk to the trait.
//!
//! # Design Principles
//!
//! - **Read/write split**: catalog and grant reads are side-effect free;
//!   the only mutation is the full replacement of one role's grant set.
//! - **Fail explicit**: every backend interaction returns a
//!   [`DirectoryResult`] so callers can distinguish unavailability from
//!   decode failures from write failures.
//! - **Observable**: implementations keep [`DirectoryStats`] counters so
//!   operators can see read/write volume and dropped grant references.
//!
//! # Example
//!
//! ```rust
//! use latch_directory::traits::DirectoryConfig;
//! use std::time::Duration;
//!
//! let config = DirectoryConfig::builder()
//!     .base_url("https://backend.example.com/rest/v1")
//!     .api_key("service-key")
//!     .timeout(Duration::from_secs(10))
//!     .build();
//!
//! assert_eq!(config.schema, "public");
//! ```

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use latch_core::error::DirectoryResult;
use latch_core::types::{
    ActionAssignment, ModuleEntry, ModuleGrants, PermissionActionId, Role, RoleId,
};

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for a backend-based permission directory.
///
/// Defaults mirror a locally hosted backend with the `public` schema and
/// conservative timeouts. `api_key` is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the REST endpoint (e.g. `https://host/rest/v1`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as both the `apikey` and bearer authorization headers.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Database schema exposed through the REST endpoint.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Overall request timeout.
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,

    /// TCP connect timeout.
    #[serde(with = "duration_secs", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Maximum idle connections kept per host.
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

fn default_base_url() -> String {
    String::new()
}

fn default_api_key() -> String {
    String::new()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_max_idle_connections() -> usize {
    10
}

/// Serde helper for serializing Duration as seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            schema: default_schema(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            max_idle_connections: default_max_idle_connections(),
        }
    }
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("schema", &self.schema)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_idle_connections", &self.max_idle_connections)
            .finish()
    }
}

impl DirectoryConfig {
    /// Create a builder for fluent construction
    pub fn builder() -> DirectoryConfigBuilder {
        DirectoryConfigBuilder::new()
    }

    /// Whether a base URL has been provided.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    /// Create a configuration suitable for testing against a local backend.
    pub fn for_testing() -> Self {
        Self {
            base_url: "http://localhost:54321/rest/v1".to_string(),
            api_key: "test-key".to_string(),
            schema: default_schema(),
            timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(1),
            max_idle_connections: 2,
        }
    }
}

/// Builder for DirectoryConfig
pub struct DirectoryConfigBuilder {
    config: DirectoryConfig,
}

impl DirectoryConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: DirectoryConfig::default(),
        }
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the exposed schema
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.config.schema = schema.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the idle connection pool size
    pub fn max_idle_connections(mut self, max: usize) -> Self {
        self.config.max_idle_connections = max;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> DirectoryConfig {
        self.config
    }
}

impl Default for DirectoryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Internal statistics with atomic counters for lock-free updates.
#[derive(Debug, Default)]
pub struct DirectoryStatsInner {
    /// Catalog (module/action) reads completed
    pub catalog_reads: AtomicU64,
    /// Role list reads completed
    pub role_reads: AtomicU64,
    /// Per-role grant reads completed
    pub grant_reads: AtomicU64,
    /// Grant set replacements completed
    pub replace_writes: AtomicU64,
    /// Failed read operations
    pub read_failures: AtomicU64,
    /// Failed write operations
    pub write_failures: AtomicU64,
    /// Granted action ids dropped because the catalog does not contain them
    pub unknown_ids_dropped: AtomicU64,
    /// Timestamp of last successful operation (nanos since epoch, 0 = never)
    pub last_success_at: AtomicI64,
    /// Timestamp of last failed operation (nanos since epoch, 0 = never)
    pub last_failure_at: AtomicI64,
}

impl DirectoryStatsInner {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed catalog read
    #[inline]
    pub fn record_catalog_read(&self) {
        self.catalog_reads.fetch_add(1, Ordering::Relaxed);
        self.touch_success();
    }

    /// Record a completed role list read
    #[inline]
    pub fn record_role_read(&self) {
        self.role_reads.fetch_add(1, Ordering::Relaxed);
        self.touch_success();
    }

    /// Record a completed grant read
    #[inline]
    pub fn record_grant_read(&self) {
        self.grant_reads.fetch_add(1, Ordering::Relaxed);
        self.touch_success();
    }

    /// Record a completed grant set replacement
    #[inline]
    pub fn record_replace_write(&self) {
        self.replace_writes.fetch_add(1, Ordering::Relaxed);
        self.touch_success();
    }

    /// Record a failed read
    #[inline]
    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
        self.touch_failure();
    }

    /// Record a failed write
    #[inline]
    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        self.touch_failure();
    }

    /// Record granted ids dropped during a catalog join
    #[inline]
    pub fn record_unknown_ids(&self, count: u64) {
        if count > 0 {
            self.unknown_ids_dropped.fetch_add(count, Ordering::Relaxed);
        }
    }

    fn touch_success(&self) {
        self.last_success_at
            .store(now_nanos(), Ordering::Relaxed);
    }

    fn touch_failure(&self) {
        self.last_failure_at
            .store(now_nanos(), Ordering::Relaxed);
    }

    /// Create a snapshot of current statistics
    pub fn snapshot(&self) -> DirectoryStats {
        DirectoryStats {
            catalog_reads: self.catalog_reads.load(Ordering::Relaxed),
            role_reads: self.role_reads.load(Ordering::Relaxed),
            grant_reads: self.grant_reads.load(Ordering::Relaxed),
            replace_writes: self.replace_writes.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            unknown_ids_dropped: self.unknown_ids_dropped.load(Ordering::Relaxed),
            last_success_at: nanos_to_datetime(self.last_success_at.load(Ordering::Relaxed)),
            last_failure_at: nanos_to_datetime(self.last_failure_at.load(Ordering::Relaxed)),
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&self) {
        self.catalog_reads.store(0, Ordering::Relaxed);
        self.role_reads.store(0, Ordering::Relaxed);
        self.grant_reads.store(0, Ordering::Relaxed);
        self.replace_writes.store(0, Ordering::Relaxed);
        self.read_failures.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.unknown_ids_dropped.store(0, Ordering::Relaxed);
        self.last_success_at.store(0, Ordering::Relaxed);
        self.last_failure_at.store(0, Ordering::Relaxed);
    }
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(0)
}

fn nanos_to_datetime(nanos: i64) -> Option<DateTime<Utc>> {
    if nanos == 0 {
        None
    } else {
        Some(DateTime::from_timestamp_nanos(nanos))
    }
}

/// Point-in-time snapshot of directory statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStats {
    /// Catalog reads completed
    pub catalog_reads: u64,
    /// Role list reads completed
    pub role_reads: u64,
    /// Per-role grant reads completed
    pub grant_reads: u64,
    /// Grant set replacements completed
    pub replace_writes: u64,
    /// Failed reads
    pub read_failures: u64,
    /// Failed writes
    pub write_failures: u64,
    /// Granted ids dropped during catalog joins
    pub unknown_ids_dropped: u64,
    /// Last successful operation, if any
    pub last_success_at: Option<DateTime<Utc>>,
    /// Last failed operation, if any
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl DirectoryStats {
    /// Total completed reads across all read kinds.
    pub fn total_reads(&self) -> u64 {
        self.catalog_reads + self.role_reads + self.grant_reads
    }

    /// Fraction of reads that completed, in `[0.0, 1.0]`.
    pub fn read_success_rate(&self) -> f64 {
        let total = self.total_reads() + self.read_failures;
        if total == 0 {
            1.0
        } else {
            self.total_reads() as f64 / total as f64
        }
    }

    /// Fraction of writes that completed, in `[0.0, 1.0]`.
    pub fn write_success_rate(&self) -> f64 {
        let total = self.replace_writes + self.write_failures;
        if total == 0 {
            1.0
        } else {
            self.replace_writes as f64 / total as f64
        }
    }
}

// ============================================================================
// Directory Trait
// ============================================================================

/// Access to the permission catalog and per-role grant sets.
///
/// Implementations must be safe to share across tasks. All methods take
/// `&self`; interior mutability is the implementation's concern.
#[async_trait]
pub trait PermissionDirectory: Send + Sync + std::fmt::Debug {
    /// Fetch the full module/action catalog.
    ///
    /// Modules are returned ordered by module code ascending and each
    /// module's actions ordered by their sort order ascending. A failure
    /// leaves any caller-held catalog untouched; callers decide whether to
    /// keep stale data.
    async fn list_modules(&self) -> DirectoryResult<Vec<ModuleEntry>>;

    /// Fetch all roles, ordered by role code ascending.
    async fn list_roles(&self) -> DirectoryResult<Vec<Role>>;

    /// Fetch the grant matrix for one role, joined against the catalog.
    ///
    /// Returns one [`ModuleGrants`] row per catalog module with every
    /// catalog action present and `assigned` reflecting the role's grants.
    /// Granted ids that no longer exist in the catalog are dropped and
    /// counted in [`DirectoryStats::unknown_ids_dropped`].
    ///
    /// `None` or a non-positive role id yields an empty result without
    /// touching the backend.
    async fn role_permissions(
        &self,
        role_id: Option<RoleId>,
    ) -> DirectoryResult<Vec<ModuleGrants>>;

    /// Replace one role's grant set wholesale.
    ///
    /// Existing grants for the role are removed first, then the given ids
    /// are inserted. The two steps are not atomic: an insert-phase failure
    /// leaves the role with no grants, which the returned
    /// [`ReplaceFailed`](latch_core::error::DirectoryError::ReplaceFailed)
    /// error reports through its phase. Ids are de-duplicated and
    /// non-positive ids dropped before writing; an empty set after
    /// normalization revokes everything and performs no insert.
    ///
    /// A non-positive `role_id` is rejected with
    /// [`InvalidRole`](latch_core::error::DirectoryError::InvalidRole)
    /// before any backend call.
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        action_ids: &[PermissionActionId],
    ) -> DirectoryResult<()>;

    /// Current statistics snapshot.
    fn stats(&self) -> DirectoryStats;
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Normalize a grant set before persisting: de-duplicate, drop non-positive
/// ids, and return the survivors in ascending order.
pub fn normalize_action_ids(action_ids: &[PermissionActionId]) -> Vec<PermissionActionId> {
    action_ids
        .iter()
        .filter(|id| id.is_valid())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Join the catalog against a role's granted id set.
///
/// Produces one [`ModuleGrants`] row per module, preserving the catalog's
/// module and action order. Granted ids absent from the catalog are
/// returned separately (ascending) so the caller can log and count them.
pub fn join_role_grants(
    modules: &[ModuleEntry],
    granted: &HashSet<PermissionActionId>,
) -> (Vec<ModuleGrants>, Vec<PermissionActionId>) {
    let mut known = HashSet::with_capacity(granted.len());

    let rows = modules
        .iter()
        .map(|module| {
            let actions = module
                .actions
                .iter()
                .map(|action| {
                    let assigned = granted.contains(&action.id);
                    if assigned {
                        known.insert(action.id);
                    }
                    ActionAssignment::new(action.clone(), assigned)
                })
                .collect();
            ModuleGrants {
                code: module.code.clone(),
                name: module.name.clone(),
                group_label: module.group_label.clone(),
                actions,
            }
        })
        .collect();

    let mut unknown: Vec<PermissionActionId> = granted
        .iter()
        .filter(|id| !known.contains(*id))
        .copied()
        .collect();
    unknown.sort();

    (rows, unknown)
}

/// Log and count granted ids that were dropped during a catalog join.
pub fn report_unknown_ids(
    stats: &DirectoryStatsInner,
    role_id: RoleId,
    unknown: &[PermissionActionId],
) {
    if unknown.is_empty() {
        return;
    }
    warn!(
        role_id = role_id.get(),
        dropped = unknown.len(),
        ids = ?unknown.iter().map(|id| id.get()).collect::<Vec<_>>(),
        "Dropping granted action ids missing from catalog"
    );
    stats.record_unknown_ids(unknown.len() as u64);
}

// ============================================================================
// Tests
// ============================================================================
