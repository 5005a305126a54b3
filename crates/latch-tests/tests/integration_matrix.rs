// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Matrix Integration Tests
//!
//! Integration tests for latch-matrix functionality including:
//!
//! - Matrix layout building (sections, rows, undefined cells)
//! - Cell and row toggles with persistence
//! - Optimistic updates and rollback on write failure
//! - Edit gating (read-only sessions, busy editor)
//! - Bulk selection with explicit save
//!
//! ## Test Categories
//!
//! - `test_matrix_layout_*`: Layout and section tests
//! - `test_matrix_toggle_*`: Cell and row toggle tests
//! - `test_matrix_gate_*`: Read-only and busy gating tests
//! - `test_matrix_bulk_*`: Bulk select and save tests

use std::sync::Arc;
use std::time::Duration;

use latch_core::error::MatrixError;
use latch_core::types::{ActionKey, RoleId};
use latch_directory::PermissionDirectory;
use latch_matrix::{EditOutcome, MatrixEditor, MatrixLayout, OTHER_SECTION};
use latch_session::PermissionCache;

use latch_tests::common::{
    assertions::{action_ids, GrantRowsAssertions, LayoutAssertions},
    fixtures::{DirectoryFixtures, RoleFixtures, SessionFixtures},
    mocks::MockDirectory,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// An editor over a seeded mock directory with an administrator session.
async fn admin_editor() -> (Arc<MockDirectory>, MatrixEditor) {
    let directory = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::admin_user()));
    let cache = Arc::new(PermissionCache::new(
        provider,
        directory.clone() as Arc<dyn PermissionDirectory>,
        "ADMIN",
    ));
    cache.refresh().await;
    let editor = MatrixEditor::new(directory.clone(), cache);
    (directory, editor)
}

/// An admin editor with the manager role (grants {1, 3}) already selected.
async fn editor_on_manager() -> (Arc<MockDirectory>, MatrixEditor) {
    let (directory, editor) = admin_editor().await;
    editor.select_role(Some(RoleFixtures::manager())).await.unwrap();
    (directory, editor)
}

// =============================================================================
// Layout
// =============================================================================

#[tokio::test]
async fn test_matrix_layout_sections_in_catalog_order_with_other_last() {
    let (_, editor) = editor_on_manager().await;

    let layout = editor.layout();

    // `audit` maps to no section, so it lands in the trailing bucket.
    layout.assert_sections(&["Operations", "Administration", OTHER_SECTION]);
}

#[tokio::test]
async fn test_matrix_layout_partial_module_has_undefined_cells() {
    let (_, editor) = editor_on_manager().await;

    let layout = editor.layout();

    layout.assert_cell_undefined("reservations", ActionKey::Create);
    layout.assert_cell_undefined("reservations", ActionKey::Delete);
    layout.assert_cell_undefined("audit", ActionKey::Update);

    let row = layout.find_row("reservations").unwrap();
    assert_eq!(row.defined_ids(), action_ids(&[20, 21]));
}

#[tokio::test]
async fn test_matrix_layout_reflects_loaded_grants() {
    let (_, editor) = editor_on_manager().await;

    let layout = editor.layout();

    layout.assert_cell_assigned("rooms", ActionKey::View);
    layout.assert_cell_assigned("rooms", ActionKey::Update);
    assert!(!layout.find_row("rooms").unwrap().fully_assigned());
    assert!(!layout.find_row("branches").unwrap().any_assigned());
}

#[tokio::test]
async fn test_matrix_layout_empty_without_role() {
    let (_, editor) = admin_editor().await;

    assert!(editor.role().is_none());
    assert!(editor.layout().is_empty());
}

#[tokio::test]
async fn test_matrix_layout_builds_from_raw_grant_rows() {
    let directory = DirectoryFixtures::seeded();
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();

    let layout = MatrixLayout::build(&rows);

    assert_eq!(layout.section_count(), 3);
    assert_eq!(layout.rows().count(), 6);
    layout.assert_cell_assigned("rooms", ActionKey::View);
}

// =============================================================================
// Cell and Row Toggles
// =============================================================================

#[tokio::test]
async fn test_matrix_toggle_cell_persists_addition() {
    let (directory, editor) = editor_on_manager().await;

    let outcome = editor.toggle_cell("rooms", ActionKey::Delete).await.unwrap();

    assert_eq!(outcome, EditOutcome::Persisted);
    assert!(!editor.is_dirty());
    assert_eq!(editor.selected_ids(), action_ids(&[1, 3, 4]).into_iter().collect());

    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 3, 4]);
}

#[tokio::test]
async fn test_matrix_toggle_cell_persists_removal() {
    let (directory, editor) = editor_on_manager().await;

    let outcome = editor.toggle_cell("rooms", ActionKey::View).await.unwrap();

    assert_eq!(outcome, EditOutcome::Persisted);
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[3]);
}

#[tokio::test]
async fn test_matrix_toggle_row_fills_partial_row() {
    let (directory, editor) = editor_on_manager().await;

    // Two of four rooms cells are checked; a row toggle checks the rest.
    let outcome = editor.toggle_row("rooms").await.unwrap();

    assert_eq!(outcome, EditOutcome::Persisted);
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 2, 3, 4]);
    assert!(editor.layout().find_row("rooms").unwrap().fully_assigned());
}

#[tokio::test]
async fn test_matrix_toggle_row_clears_full_row() {
    let (directory, editor) = editor_on_manager().await;

    editor.toggle_row("rooms").await.unwrap();
    let outcome = editor.toggle_row("rooms").await.unwrap();

    assert_eq!(outcome, EditOutcome::Persisted);
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_nothing_assigned();
}

#[tokio::test]
async fn test_matrix_toggle_row_only_touches_defined_cells() {
    let (directory, editor) = editor_on_manager().await;

    editor.toggle_row("reservations").await.unwrap();

    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    // Both defined reservations actions plus the untouched rooms pair.
    rows.assert_assigned_ids(&[1, 3, 20, 21]);
}

#[tokio::test]
async fn test_matrix_toggle_unknown_targets_are_errors() {
    let (_, editor) = editor_on_manager().await;

    let err = editor.toggle_cell("payroll", ActionKey::View).await.unwrap_err();
    assert!(matches!(err, MatrixError::UnknownModule { .. }));

    // The module exists but never defines the action.
    let err = editor.toggle_cell("audit", ActionKey::Delete).await.unwrap_err();
    assert!(matches!(err, MatrixError::UnknownCell { .. }));

    let err = editor.toggle_row("payroll").await.unwrap_err();
    assert!(matches!(err, MatrixError::UnknownModule { .. }));
}

#[tokio::test]
async fn test_matrix_toggle_without_role_is_error() {
    let (_, editor) = admin_editor().await;

    let err = editor.toggle_cell("rooms", ActionKey::View).await.unwrap_err();
    assert!(matches!(err, MatrixError::NoRoleSelected));
}

// =============================================================================
// Rollback
// =============================================================================

#[tokio::test]
async fn test_matrix_toggle_rolls_back_on_write_failure() {
    let (directory, editor) = editor_on_manager().await;

    directory.fail_next_write();
    let result = editor.toggle_cell("rooms", ActionKey::Delete).await;

    assert!(result.is_err());
    // The optimistic check is gone again; backend state was refetched.
    assert_eq!(editor.selected_ids(), action_ids(&[1, 3]).into_iter().collect());
    assert!(!editor.is_saving());
    editor.layout().assert_cell_assigned("rooms", ActionKey::View);

    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 3]);
}

#[tokio::test]
async fn test_matrix_toggle_insert_failure_surfaces_cleared_role() {
    let (directory, editor) = editor_on_manager().await;

    directory.fail_insert_phase(true);
    let result = editor.toggle_cell("rooms", ActionKey::Delete).await;
    directory.fail_insert_phase(false);

    // The write died between delete and insert; the rollback refetch shows
    // the role now holds nothing, and the editor reflects that truthfully.
    let err = result.unwrap_err();
    match err {
        MatrixError::Directory(e) => assert!(e.left_role_empty()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(editor.selected_ids().is_empty());

    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_nothing_assigned();
}

#[tokio::test]
async fn test_matrix_toggle_rollback_without_reload_reverts_to_baseline() {
    let (directory, editor) = editor_on_manager().await;

    // The write and the rollback refetch both fail.
    directory.fail_all_writes(true);
    directory.fail_all_reads(true);
    let result = editor.toggle_cell("rooms", ActionKey::Delete).await;
    directory.fail_all_writes(false);
    directory.fail_all_reads(false);

    assert!(result.is_err());
    assert_eq!(editor.selected_ids(), action_ids(&[1, 3]).into_iter().collect());
}

// =============================================================================
// Gating
// =============================================================================

#[tokio::test]
async fn test_matrix_gate_read_only_session_cannot_edit() {
    let directory = Arc::new(MockDirectory::with_inner(DirectoryFixtures::seeded()));
    // The viewer holds permissions view (40) but not permissions update (41).
    let provider = Arc::new(SessionFixtures::provider_for(SessionFixtures::viewer_user()));
    let cache = Arc::new(PermissionCache::new(
        provider,
        directory.clone() as Arc<dyn PermissionDirectory>,
        "ADMIN",
    ));
    cache.refresh().await;
    let editor = MatrixEditor::new(directory.clone(), cache);
    editor.select_role(Some(RoleFixtures::manager())).await.unwrap();

    assert!(!editor.can_edit());
    let outcome = editor.toggle_cell("rooms", ActionKey::Delete).await.unwrap();
    assert_eq!(outcome, EditOutcome::ReadOnly);

    // Nothing was written.
    assert_eq!(directory.get_write_count(), 0);
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 3]);
}

#[tokio::test]
async fn test_matrix_gate_busy_editor_drops_toggle() {
    let (directory, editor) = editor_on_manager().await;
    let editor = Arc::new(editor);
    directory.set_write_latency(Duration::from_millis(80));

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.toggle_cell("rooms", ActionKey::Delete).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // A second toggle while the save is in flight is dropped, not queued.
    assert!(editor.is_saving());
    let outcome = editor.toggle_cell("branches", ActionKey::View).await.unwrap();
    assert_eq!(outcome, EditOutcome::Busy);

    assert_eq!(slow.await.unwrap().unwrap(), EditOutcome::Persisted);
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 3, 4]);
}

#[tokio::test]
async fn test_matrix_gate_role_switch_discards_stale_save() {
    let (directory, editor) = editor_on_manager().await;
    let editor = Arc::new(editor);
    directory.set_write_latency(Duration::from_millis(80));

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.toggle_cell("rooms", ActionKey::Delete).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    directory.set_write_latency(Duration::ZERO);
    editor.select_role(Some(RoleFixtures::viewer())).await.unwrap();
    slow.await.unwrap().unwrap();

    // The editor shows the viewer's matrix, not the manager's stale save.
    assert_eq!(editor.role().unwrap().id, RoleId::new(9));
    assert_eq!(
        editor.selected_ids(),
        action_ids(&[1, 10, 20, 30, 40, 50]).into_iter().collect()
    );
}

#[tokio::test]
async fn test_matrix_gate_failed_role_switch_releases_saving_gate() {
    let (directory, editor) = editor_on_manager().await;
    let editor = Arc::new(editor);
    directory.set_write_latency(Duration::from_millis(80));

    let slow = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.toggle_cell("rooms", ActionKey::Delete).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Switch roles mid-write; the new role's load fails, then the stale
    // persist lands and is discarded by the epoch guard.
    directory.fail_next_read();
    let switch = editor.select_role(Some(RoleFixtures::viewer())).await;
    assert!(switch.is_err());
    slow.await.unwrap().unwrap();

    // The previous matrix is still on screen and the editor is not stuck
    // reporting a save that no longer exists.
    assert_eq!(editor.role().unwrap().id, RoleId::new(7));
    assert!(!editor.is_saving());
    directory.set_write_latency(Duration::ZERO);
    let outcome = editor.toggle_cell("branches", ActionKey::View).await.unwrap();
    assert_eq!(outcome, EditOutcome::Persisted);
}

// =============================================================================
// Bulk Selection and Save
// =============================================================================

#[tokio::test]
async fn test_matrix_bulk_select_all_is_local_until_saved() {
    let (directory, editor) = editor_on_manager().await;
    let writes_before = directory.get_write_count();

    let outcome = editor.select_all().unwrap();

    assert_eq!(outcome, EditOutcome::Applied);
    assert!(editor.is_dirty());
    assert_eq!(directory.get_write_count(), writes_before);

    let saved = editor.save().await.unwrap();
    assert_eq!(saved, EditOutcome::Persisted);
    assert!(!editor.is_dirty());

    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 2, 3, 4, 10, 11, 12, 13, 20, 21, 30, 31, 32, 33, 40, 41, 50]);
}

#[tokio::test]
async fn test_matrix_bulk_deselect_all_then_save_revokes_role() {
    let (directory, editor) = editor_on_manager().await;

    editor.deselect_all().unwrap();
    editor.save().await.unwrap();

    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_nothing_assigned();
}

#[tokio::test]
async fn test_matrix_bulk_discard_reverts_local_edits() {
    let (_, editor) = editor_on_manager().await;

    editor.select_all().unwrap();
    assert!(editor.is_dirty());

    editor.discard_changes();

    assert!(!editor.is_dirty());
    assert_eq!(editor.selected_ids(), editor.baseline_ids());
    assert_eq!(editor.selected_ids(), action_ids(&[1, 3]).into_iter().collect());
}

#[tokio::test]
async fn test_matrix_bulk_save_without_changes_is_still_persisted() {
    let (directory, editor) = editor_on_manager().await;

    let outcome = editor.save().await.unwrap();

    assert_eq!(outcome, EditOutcome::Persisted);
    let rows = directory.role_permissions(Some(RoleId::new(7))).await.unwrap();
    rows.assert_assigned_ids(&[1, 3]);
}
