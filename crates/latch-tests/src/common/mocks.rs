// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Mock implementations for testing Latch components in isolation.
//!
//! ## Design Principles
//!
//! - Configurable behavior for different test scenarios
//! - Recording of interactions for verification
//! - Thread-safe for concurrent testing
//! - Easy to set up error injection

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use latch_core::error::{DirectoryError, DirectoryResult, ReplacePhase};
use latch_core::types::{ModuleEntry, ModuleGrants, PermissionActionId, Role, RoleId};
use latch_directory::{DirectoryStats, MemoryDirectory, PermissionDirectory};

// =============================================================================
// Mock Directory
// =============================================================================

/// A highly configurable mock permission directory.
///
/// Wraps a [`MemoryDirectory`] for the actual catalog and grant semantics
/// and layers failure injection, latency simulation, and interaction
/// recording on top.
#[derive(Debug, Default)]
pub struct MockDirectory {
    /// Backing store providing real join and normalization semantics.
    inner: MemoryDirectory,

    /// Simulated latency applied to reads.
    read_latency: Mutex<Duration>,

    /// Simulated latency applied to writes.
    write_latency: Mutex<Duration>,

    /// Force next read to fail.
    fail_next_read: AtomicBool,

    /// Force next write to fail.
    fail_next_write: AtomicBool,

    /// Force all reads to fail.
    fail_all_reads: AtomicBool,

    /// Force all writes to fail.
    fail_all_writes: AtomicBool,

    /// Fail writes after the delete phase, leaving the role empty.
    fail_insert_phase: AtomicBool,

    /// Read count for verification.
    read_count: AtomicU64,

    /// Write count for verification.
    write_count: AtomicU64,

    /// Write history for verification.
    write_history: Mutex<Vec<(RoleId, Vec<PermissionActionId>)>>,
}

impl MockDirectory {
    /// Create an empty mock directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock over a pre-seeded memory directory.
    pub fn with_inner(inner: MemoryDirectory) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Access the backing store for seeding.
    pub fn inner(&self) -> &MemoryDirectory {
        &self.inner
    }

    /// Set the read latency.
    pub fn set_read_latency(&self, latency: Duration) {
        *self.read_latency.lock() = latency;
    }

    /// Set the write latency.
    pub fn set_write_latency(&self, latency: Duration) {
        *self.write_latency.lock() = latency;
    }

    /// Force the next read to fail.
    pub fn fail_next_read(&self) {
        self.fail_next_read.store(true, Ordering::SeqCst);
    }

    /// Force the next write to fail.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Force all reads to fail.
    pub fn fail_all_reads(&self, fail: bool) {
        self.fail_all_reads.store(fail, Ordering::SeqCst);
    }

    /// Force all writes to fail.
    pub fn fail_all_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes fail between the delete and the insert, mimicking the
    /// non-atomic replacement window: the role ends up with zero grants.
    pub fn fail_insert_phase(&self, fail: bool) {
        self.fail_insert_phase.store(fail, Ordering::SeqCst);
    }

    /// Get the read count.
    pub fn get_read_count(&self) -> u64 {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Get the write count.
    pub fn get_write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Get the write history.
    pub fn get_write_history(&self) -> Vec<(RoleId, Vec<PermissionActionId>)> {
        self.write_history.lock().clone()
    }

    /// Clear all counters, history, and failure flags.
    pub fn reset(&self) {
        self.read_count.store(0, Ordering::SeqCst);
        self.write_count.store(0, Ordering::SeqCst);
        self.write_history.lock().clear();
        self.fail_next_read.store(false, Ordering::SeqCst);
        self.fail_next_write.store(false, Ordering::SeqCst);
        self.fail_all_reads.store(false, Ordering::SeqCst);
        self.fail_all_writes.store(false, Ordering::SeqCst);
        self.fail_insert_phase.store(false, Ordering::SeqCst);
    }

    async fn before_read(&self) -> DirectoryResult<()> {
        self.read_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_all_reads.load(Ordering::SeqCst) {
            return Err(DirectoryError::unavailable("Mock read failure"));
        }
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(DirectoryError::unavailable("Mock single read failure"));
        }

        let latency = *self.read_latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionDirectory for MockDirectory {
    async fn list_modules(&self) -> DirectoryResult<Vec<ModuleEntry>> {
        self.before_read().await?;
        self.inner.list_modules().await
    }

    async fn list_roles(&self) -> DirectoryResult<Vec<Role>> {
        self.before_read().await?;
        self.inner.list_roles().await
    }

    async fn role_permissions(
        &self,
        role_id: Option<RoleId>,
    ) -> DirectoryResult<Vec<ModuleGrants>> {
        self.before_read().await?;
        self.inner.role_permissions(role_id).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        action_ids: &[PermissionActionId],
    ) -> DirectoryResult<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_all_writes.load(Ordering::SeqCst) {
            return Err(DirectoryError::replace_failed(
                role_id.get(),
                ReplacePhase::Delete,
                "Mock write failure",
            ));
        }
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(DirectoryError::replace_failed(
                role_id.get(),
                ReplacePhase::Delete,
                "Mock single write failure",
            ));
        }
        if self.fail_insert_phase.load(Ordering::SeqCst) {
            // The delete landed; the insert did not.
            self.inner.replace_role_permissions(role_id, &[]).await?;
            return Err(DirectoryError::replace_failed(
                role_id.get(),
                ReplacePhase::Insert,
                "Mock insert failure",
            ));
        }

        let latency = *self.write_latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.write_history
            .lock()
            .push((role_id, action_ids.to_vec()));

        self.inner.replace_role_permissions(role_id, action_ids).await
    }

    fn stats(&self) -> DirectoryStats {
        self.inner.stats()
    }
}

// =============================================================================
// Mock Failure Injector
// =============================================================================

/// Injects failures according to a pattern.
pub struct MockFailureInjector {
    /// Failure pattern: true = fail, false = succeed.
    pattern: Vec<bool>,
    /// Current index in the pattern.
    index: AtomicU64,
    /// Whether to cycle through the pattern or stop at the end.
    cycle: bool,
}

impl MockFailureInjector {
    /// Create a new injector with a failure pattern.
    pub fn new(pattern: Vec<bool>) -> Self {
        Self {
            pattern,
            index: AtomicU64::new(0),
            cycle: true,
        }
    }

    /// Create an injector that fails the first N calls.
    pub fn first_n(n: usize) -> Self {
        let mut pattern = vec![true; n];
        pattern.push(false);
        Self::new(pattern).with_cycle(false)
    }

    /// Create an injector that always fails.
    pub fn always_fail() -> Self {
        Self::new(vec![true]).with_cycle(true)
    }

    /// Create an injector that never fails.
    pub fn never_fail() -> Self {
        Self::new(vec![false]).with_cycle(true)
    }

    /// Set whether to cycle through the pattern.
    pub fn with_cycle(mut self, cycle: bool) -> Self {
        self.cycle = cycle;
        self
    }

    /// Check if the next operation should fail.
    pub fn should_fail(&self) -> bool {
        if self.pattern.is_empty() {
            return false;
        }

        let index = self.index.fetch_add(1, Ordering::SeqCst) as usize;
        let actual_index = if self.cycle {
            index % self.pattern.len()
        } else {
            index.min(self.pattern.len() - 1)
        };

        self.pattern[actual_index]
    }

    /// Reset the injector.
    pub fn reset(&self) {
        self.index.store(0, Ordering::SeqCst);
    }
}

// =============================================================================
// Tests
// =============================================================================
