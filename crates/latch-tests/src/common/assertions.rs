// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Domain-specific assertion helpers for Latch integration tests.
//!
//! ## Design Principles
//!
//! - Provide clear, informative failure messages
//! - Support both synchronous and asynchronous assertions
//! - Chain-able assertions for complex validations

use latch_core::types::{ActionKey, ModuleGrants, PermissionActionId};
use latch_matrix::MatrixLayout;
use latch_session::PermissionSnapshot;

// =============================================================================
// ModuleGrants Assertions
// =============================================================================

/// Assertion extensions for slices of [`ModuleGrants`].
pub trait GrantRowsAssertions {
    /// Assert that a module's action is assigned.
    fn assert_assigned(&self, module: &str, key: ActionKey);

    /// Assert that a module's action is present but not assigned.
    fn assert_unassigned(&self, module: &str, key: ActionKey);

    /// Assert the exact assigned id set across all modules.
    fn assert_assigned_ids(&self, expected: &[i64]);

    /// Assert that no action anywhere is assigned.
    fn assert_nothing_assigned(&self);

    /// Find a module row, panicking with a useful message if absent.
    fn row(&self, module: &str) -> &ModuleGrants;
}

impl GrantRowsAssertions for [ModuleGrants] {
    fn assert_assigned(&self, module: &str, key: ActionKey) {
        let row = self.row(module);
        let assignment = row
            .actions
            .iter()
            .find(|a| a.key() == key)
            .unwrap_or_else(|| panic!("Module '{}' does not define action '{}'", module, key));
        assert!(
            assignment.assigned,
            "Expected {}:{} to be assigned, but it is not",
            module, key
        );
    }

    fn assert_unassigned(&self, module: &str, key: ActionKey) {
        let row = self.row(module);
        let assignment = row
            .actions
            .iter()
            .find(|a| a.key() == key)
            .unwrap_or_else(|| panic!("Module '{}' does not define action '{}'", module, key));
        assert!(
            !assignment.assigned,
            "Expected {}:{} to be unassigned, but it is assigned",
            module, key
        );
    }

    fn assert_assigned_ids(&self, expected: &[i64]) {
        let mut actual: Vec<i64> = self
            .iter()
            .flat_map(|row| row.assigned_ids())
            .map(|id| id.get())
            .collect();
        actual.sort_unstable();
        let mut expected: Vec<i64> = expected.to_vec();
        expected.sort_unstable();
        assert_eq!(
            actual, expected,
            "Assigned id set mismatch (actual vs expected)"
        );
    }

    fn assert_nothing_assigned(&self) {
        for row in self {
            let assigned = row.assigned_ids();
            assert!(
                assigned.is_empty(),
                "Expected no assignments, but module '{}' has {:?}",
                row.code,
                assigned
            );
        }
    }

    fn row(&self, module: &str) -> &ModuleGrants {
        self.iter()
            .find(|r| r.code.as_str() == module)
            .unwrap_or_else(|| {
                let known: Vec<&str> = self.iter().map(|r| r.code.as_str()).collect();
                panic!("Module '{}' not in grant rows (have: {:?})", module, known)
            })
    }
}

// =============================================================================
// Snapshot Assertions
// =============================================================================

/// Assertion extensions for [`PermissionSnapshot`].
pub trait SnapshotAssertions {
    /// Assert that the snapshot allows an action.
    fn assert_allows(&self, module: &str, key: ActionKey);

    /// Assert that the snapshot denies an action.
    fn assert_denies(&self, module: &str, key: ActionKey);

    /// Assert that the snapshot denies every action on a module.
    fn assert_denies_all(&self, module: &str);
}

impl SnapshotAssertions for PermissionSnapshot {
    fn assert_allows(&self, module: &str, key: ActionKey) {
        assert!(
            self.allows(module, key),
            "Expected snapshot to allow {}:{}, but it denies it",
            module,
            key
        );
    }

    fn assert_denies(&self, module: &str, key: ActionKey) {
        assert!(
            !self.allows(module, key),
            "Expected snapshot to deny {}:{}, but it allows it",
            module,
            key
        );
    }

    fn assert_denies_all(&self, module: &str) {
        for key in ActionKey::all() {
            self.assert_denies(module, key);
        }
    }
}

// =============================================================================
// Layout Assertions
// =============================================================================

/// Assertion extensions for [`MatrixLayout`].
pub trait LayoutAssertions {
    /// Assert the exact section labels in display order.
    fn assert_sections(&self, expected: &[&str]);

    /// Assert that a row's cell is checked.
    fn assert_cell_assigned(&self, module: &str, key: ActionKey);

    /// Assert that a row's cell exists but is not backed by the catalog.
    fn assert_cell_undefined(&self, module: &str, key: ActionKey);
}

impl LayoutAssertions for MatrixLayout {
    fn assert_sections(&self, expected: &[&str]) {
        let actual: Vec<&str> = self.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(actual, expected, "Section order mismatch");
    }

    fn assert_cell_assigned(&self, module: &str, key: ActionKey) {
        let row = self
            .find_row(module)
            .unwrap_or_else(|| panic!("Module '{}' not in layout", module));
        assert!(
            row.cell(key).assigned,
            "Expected cell {}:{} to be checked",
            module,
            key
        );
    }

    fn assert_cell_undefined(&self, module: &str, key: ActionKey) {
        let row = self
            .find_row(module)
            .unwrap_or_else(|| panic!("Module '{}' not in layout", module));
        let cell = row.cell(key);
        assert!(
            !cell.is_defined(),
            "Expected cell {}:{} to be undefined, but it has id {:?}",
            module,
            key,
            cell.action_id
        );
    }
}

// =============================================================================
// Id Helpers
// =============================================================================

/// Convert raw numbers into action ids, for terse test bodies.
pub fn action_ids(raw: &[i64]) -> Vec<PermissionActionId> {
    raw.iter().copied().map(PermissionActionId::new).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use latch_core::types::{ActionAssignment, ModuleCode, PermissionAction};

    fn rows() -> Vec<ModuleGrants> {
        vec![ModuleGrants {
            code: ModuleCode::new("rooms"),
            name: "Rooms".to_string(),
            group_label: None,
            actions: vec![
                ActionAssignment::new(
                    PermissionAction::new(PermissionActionId::new(1), ActionKey::View, "view"),
                    true,
                ),
                ActionAssignment::new(
                    PermissionAction::new(PermissionActionId::new(2), ActionKey::Create, "create"),
                    false,
                ),
            ],
        }]
    }

    #[test]
    fn test_grant_rows_assertions_pass() {
        let rows = rows();
        rows.assert_assigned("rooms", ActionKey::View);
        rows.assert_unassigned("rooms", ActionKey::Create);
        rows.assert_assigned_ids(&[1]);
    }

    #[test]
    #[should_panic(expected = "Expected rooms:create to be assigned")]
    fn test_grant_rows_assertions_fail() {
        rows().assert_assigned("rooms", ActionKey::Create);
    }

    #[test]
    #[should_panic(expected = "not in grant rows")]
    fn test_missing_module_panics() {
        rows().row("billing");
    }

    #[test]
    fn test_snapshot_assertions() {
        let snapshot = PermissionSnapshot::from_grants(&rows());
        snapshot.assert_allows("rooms", ActionKey::View);
        snapshot.assert_denies("rooms", ActionKey::Create);
        snapshot.assert_denies_all("branches");
    }

    #[test]
    fn test_action_ids_helper() {
        assert_eq!(
            action_ids(&[3, 1]),
            vec![PermissionActionId::new(3), PermissionActionId::new(1)]
        );
    }
}
