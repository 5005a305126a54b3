// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Session Integration Tests
//!
//! Integration tests for latch-session functionality including:
//!
//! - Permission cache lifecycle (empty, loading, ready, failed)
//! - Fail-closed behavior on directory failures
//! - Administrator bypass
//! - Snapshot freshness under concurrent refreshes
//!
//! ## Test Categories
//!
//! - `test_cache_lifecycle_*`: Phase transition tests
//! - `test_cache_check_*`: Capability check tests
//! - `test_cache_admin_*`: Administrator bypass tests
//! - `test_cache_concurrent_*`: Concurrency and freshness tests

use std::sync::Arc;
use std::time::Duration;

use latch_core::types::{ActionKey, RoleId};
use latch_directory::PermissionDirectory;
use latch_session::{CachePhase, PermissionCache, RefreshOutcome, StaticSessionProvider};

use latch_tests::common::{
    assertions::{action_ids, SnapshotAssertions},
    fixtures::{DirectoryFixtures, SessionFixtures},
    mocks::MockDirectory,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn cache_over(
    provider: Arc<StaticSessionProvider>,
    directory: Arc<dyn PermissionDirectory>,
) -> PermissionCache {
    PermissionCache::new(provider, directory, "ADMIN")
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_cache_lifecycle_starts_empty_and_denies() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, Arc::new(DirectoryFixtures::seeded()));

    assert_eq!(cache.phase(), CachePhase::Empty);
    assert!(!cache.can_view("rooms"));
    assert!(!cache.can_perform("rooms", ActionKey::Update));
    assert!(cache.last_updated().is_none());
}

#[tokio::test]
async fn test_cache_lifecycle_refresh_loads_scoped_snapshot() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, Arc::new(DirectoryFixtures::seeded()));

    let outcome = cache.refresh().await;

    assert_eq!(outcome, RefreshOutcome::Loaded);
    assert_eq!(cache.phase(), CachePhase::Ready);
    assert!(cache.last_updated().is_some());

    // Manager holds rooms view and update, nothing else.
    assert!(cache.can_view("rooms"));
    assert!(cache.can_perform("rooms", ActionKey::Update));
    assert!(!cache.can_perform("rooms", ActionKey::Delete));
    assert!(!cache.can_view("branches"));
    assert!(!cache.can_perform("permissions", ActionKey::Update));
}

#[tokio::test]
async fn test_cache_lifecycle_resolving_session_skips_load() {
    let provider = Arc::new(StaticSessionProvider::resolving());
    let cache = cache_over(provider.clone(), Arc::new(DirectoryFixtures::seeded()));

    let outcome = cache.refresh().await;

    assert_eq!(outcome, RefreshOutcome::SessionResolving);
    assert_eq!(cache.phase(), CachePhase::Empty);
    assert!(!cache.can_view("rooms"));

    // Once the session settles the load goes through.
    provider.set_user(SessionFixtures::manager_user());
    provider.set_resolving(false);
    assert_eq!(cache.refresh().await, RefreshOutcome::Loaded);
    assert!(cache.can_view("rooms"));
}

#[tokio::test]
async fn test_cache_lifecycle_clear_on_sign_out() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider.clone(), Arc::new(DirectoryFixtures::seeded()));

    cache.refresh().await;
    assert!(cache.can_view("rooms"));

    provider.clear();
    cache.clear();

    assert_eq!(cache.phase(), CachePhase::Empty);
    assert!(!cache.can_view("rooms"));
    assert!(cache.last_updated().is_none());
    cache.snapshot().assert_denies_all("rooms");
}

#[tokio::test]
async fn test_cache_lifecycle_refresh_after_grant_edit_picks_up_change() {
    let directory = Arc::new(DirectoryFixtures::seeded());
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, directory.clone());

    cache.refresh().await;
    assert!(!cache.can_perform("rooms", ActionKey::Delete));

    // Grant rooms delete (4) to the manager role behind the cache's back.
    directory
        .replace_role_permissions(RoleId::new(7), &action_ids(&[1, 3, 4]))
        .await
        .unwrap();

    // Stale until refreshed.
    assert!(!cache.can_perform("rooms", ActionKey::Delete));
    cache.refresh().await;
    assert!(cache.can_perform("rooms", ActionKey::Delete));
}

// =============================================================================
// Fail-Closed Behavior
// =============================================================================

#[tokio::test]
async fn test_cache_check_failed_load_denies_everything() {
    let mock = MockDirectory::with_inner(DirectoryFixtures::seeded());
    mock.fail_all_reads(true);
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, Arc::new(mock));

    let outcome = cache.refresh().await;

    assert_eq!(outcome, RefreshOutcome::FailedClosed);
    assert_eq!(cache.phase(), CachePhase::Failed);
    assert!(cache.last_error().is_some());
    assert!(!cache.can_view("rooms"));
    assert!(!cache.can_perform("rooms", ActionKey::Update));
}

#[tokio::test]
async fn test_cache_check_recovers_after_transient_failure() {
    let mock = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    mock.fail_next_read();
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, mock);

    assert_eq!(cache.refresh().await, RefreshOutcome::FailedClosed);
    assert_eq!(cache.refresh().await, RefreshOutcome::Loaded);

    assert_eq!(cache.phase(), CachePhase::Ready);
    assert!(cache.last_error().is_none());
    assert!(cache.can_view("rooms"));
}

#[tokio::test]
async fn test_cache_check_failure_replaces_previous_snapshot() {
    let mock = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, mock.clone());

    cache.refresh().await;
    assert!(cache.can_view("rooms"));

    // A failed reload must not keep serving the stale grant set.
    mock.fail_next_read();
    assert_eq!(cache.refresh().await, RefreshOutcome::FailedClosed);
    assert!(!cache.can_view("rooms"));
}

// =============================================================================
// Roleless and Empty Sessions
// =============================================================================

#[tokio::test]
async fn test_cache_check_roleless_user_gets_empty_snapshot() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::roleless_user()));
    let cache = cache_over(provider, Arc::new(DirectoryFixtures::seeded()));

    let outcome = cache.refresh().await;

    // The load succeeds; the snapshot just grants nothing.
    assert_eq!(outcome, RefreshOutcome::Loaded);
    assert_eq!(cache.phase(), CachePhase::Ready);
    assert!(cache.snapshot().is_empty());
    assert!(!cache.can_view("rooms"));
}

#[tokio::test]
async fn test_cache_check_role_with_no_grants_denies_all() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = cache_over(provider, Arc::new(DirectoryFixtures::empty_grants()));

    cache.refresh().await;

    assert_eq!(cache.phase(), CachePhase::Ready);
    cache.snapshot().assert_denies_all("rooms");
    cache.snapshot().assert_denies_all("branches");
}

#[tokio::test]
async fn test_cache_check_unknown_module_is_denied() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::viewer_user()));
    let cache = cache_over(provider, Arc::new(DirectoryFixtures::seeded()));

    cache.refresh().await;

    assert!(cache.can_view("rooms"));
    assert!(!cache.can_view("payroll"));
    cache.snapshot().assert_denies("payroll", ActionKey::View);
}

// =============================================================================
// Administrator Bypass
// =============================================================================

#[tokio::test]
async fn test_cache_admin_allows_everything_without_directory() {
    // Reads fail; the admin decision never touches the directory.
    let mock = MockDirectory::with_inner(DirectoryFixtures::seeded());
    mock.fail_all_reads(true);
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::admin_user()));
    let cache = cache_over(provider, Arc::new(mock));

    let outcome = cache.refresh().await;

    assert_eq!(outcome, RefreshOutcome::Loaded);
    assert!(cache.snapshot().is_admin());
    assert!(cache.can_perform("rooms", ActionKey::Delete));
    // Even modules absent from the catalog, but never an empty code.
    assert!(cache.can_perform("payroll", ActionKey::Delete));
    assert!(!cache.can_perform("", ActionKey::View));
    cache.snapshot().assert_allows("permissions", ActionKey::Update);
}

#[tokio::test]
async fn test_cache_admin_code_is_configurable() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let directory = Arc::new(DirectoryFixtures::empty_grants());

    // With MANAGER as the configured admin code, the manager bypasses grants.
    let cache = PermissionCache::new(provider.clone(), directory.clone(), "MANAGER");
    cache.refresh().await;
    assert!(cache.snapshot().is_admin());
    assert!(cache.can_perform("audit", ActionKey::View));

    // With the default code the same session is scoped.
    let cache = cache_over(provider, directory);
    cache.refresh().await;
    assert!(!cache.snapshot().is_admin());
    assert!(!cache.can_view("audit"));
}

#[tokio::test]
async fn test_cache_admin_bypass_ends_on_sign_out() {
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::admin_user()));
    let cache = cache_over(provider.clone(), Arc::new(DirectoryFixtures::seeded()));

    cache.refresh().await;
    assert!(cache.can_perform("rooms", ActionKey::Delete));

    provider.clear();
    cache.clear();
    cache.refresh().await;

    assert!(!cache.can_perform("rooms", ActionKey::Delete));
}

// =============================================================================
// Concurrency and Freshness
// =============================================================================

#[tokio::test]
async fn test_cache_concurrent_slow_load_is_superseded() {
    let mock = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    mock.set_read_latency(Duration::from_millis(80));
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = Arc::new(cache_over(provider, mock.clone()));

    let slow = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.refresh().await })
    };
    // Let the slow load claim its epoch before racing it.
    tokio::time::sleep(Duration::from_millis(10)).await;

    mock.set_read_latency(Duration::ZERO);
    let fast = cache.refresh().await;
    let slow = slow.await.unwrap();

    // The newer call wins; the older result is dropped.
    assert_eq!(fast, RefreshOutcome::Loaded);
    assert_eq!(slow, RefreshOutcome::Superseded);
    assert_eq!(cache.phase(), CachePhase::Ready);
    assert_eq!(cache.stats().superseded_loads, 1);
}

#[tokio::test]
async fn test_cache_concurrent_clear_invalidates_inflight_load() {
    let mock = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    mock.set_read_latency(Duration::from_millis(80));
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::manager_user()));
    let cache = Arc::new(cache_over(provider, mock));

    let load = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Sign-out while the load is in flight.
    cache.clear();
    let outcome = load.await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert_eq!(cache.phase(), CachePhase::Empty);
    assert!(!cache.can_view("rooms"));
}

#[tokio::test]
async fn test_cache_stats_count_outcomes() {
    let mock = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    let provider = Arc::new(StaticSessionProvider::resolving());
    let cache = cache_over(provider.clone(), mock.clone());

    cache.refresh().await;
    provider.set_user(SessionFixtures::manager_user());
    cache.refresh().await;
    mock.fail_next_read();
    cache.refresh().await;

    let stats = cache.stats();
    assert_eq!(stats.skipped_resolving, 1);
    assert_eq!(stats.loads, 1);
    assert_eq!(stats.fail_closed_loads, 1);
}
