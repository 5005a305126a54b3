// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built test data for consistent and reproducible testing.
//!
//! ## Design Principles
//!
//! - Fixtures are immutable and thread-safe
//! - Each fixture represents a realistic scenario
//! - Fixtures can be composed for complex test scenarios
//!
//! The standard catalog mirrors the console's real module universe: full
//! CRUD modules (`rooms`, `branches`, `roles`), partial modules that only
//! define a subset of actions (`reservations`, `permissions`), and one
//! module outside every known section (`audit`).

use latch_core::types::{
    ActionKey, ModuleEntry, PermissionAction, PermissionActionId, Role, RoleId, RoleStatus,
};
use latch_directory::MemoryDirectory;
use latch_session::{SessionUser, StaticSessionProvider};

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// Fixture providing standard module catalogs.
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// The full standard catalog: six modules across three sections.
    ///
    /// Action id layout (stable across all tests):
    ///
    /// | module       | view | create | update | delete |
    /// |--------------|------|--------|--------|--------|
    /// | rooms        | 1    | 2      | 3      | 4      |
    /// | branches     | 10   | 11     | 12     | 13     |
    /// | reservations | 20   | -      | 21     | -      |
    /// | roles        | 30   | 31     | 32     | 33     |
    /// | permissions  | 40   | -      | 41     | -      |
    /// | audit        | 50   | -      | -      | -      |
    pub fn standard() -> Vec<ModuleEntry> {
        vec![
            Self::rooms(),
            Self::branches(),
            Self::reservations(),
            Self::roles(),
            Self::permissions(),
            Self::audit(),
        ]
    }

    /// The `rooms` module with all four actions (ids 1-4).
    pub fn rooms() -> ModuleEntry {
        full_module("rooms", "Rooms", 1)
    }

    /// The `branches` module with all four actions (ids 10-13).
    pub fn branches() -> ModuleEntry {
        full_module("branches", "Branches", 10)
    }

    /// The `reservations` module defining only view (20) and update (21).
    pub fn reservations() -> ModuleEntry {
        ModuleEntry::new("reservations", "Reservations")
            .with_action(action(20, ActionKey::View, 1))
            .with_action(action(21, ActionKey::Update, 2))
    }

    /// The `roles` module with all four actions (ids 30-33).
    pub fn roles() -> ModuleEntry {
        full_module("roles", "Roles", 30)
    }

    /// The `permissions` module defining only view (40) and update (41).
    pub fn permissions() -> ModuleEntry {
        ModuleEntry::new("permissions", "Permissions")
            .with_action(action(40, ActionKey::View, 1))
            .with_action(action(41, ActionKey::Update, 2))
    }

    /// The `audit` module (view only, id 50); not in any known section.
    pub fn audit() -> ModuleEntry {
        ModuleEntry::new("audit", "Audit Log").with_action(action(50, ActionKey::View, 1))
    }

    /// Every action id across the standard catalog, ascending.
    pub fn all_action_ids() -> Vec<PermissionActionId> {
        [1, 2, 3, 4, 10, 11, 12, 13, 20, 21, 30, 31, 32, 33, 40, 41, 50]
            .into_iter()
            .map(PermissionActionId::new)
            .collect()
    }
}

fn full_module(code: &str, name: &str, base_id: i64) -> ModuleEntry {
    ModuleEntry::new(code, name)
        .with_action(action(base_id, ActionKey::View, 1))
        .with_action(action(base_id + 1, ActionKey::Create, 2))
        .with_action(action(base_id + 2, ActionKey::Update, 3))
        .with_action(action(base_id + 3, ActionKey::Delete, 4))
}

fn action(id: i64, key: ActionKey, sort_order: i32) -> PermissionAction {
    PermissionAction::new(PermissionActionId::new(id), key, key.as_str()).with_sort_order(sort_order)
}

// =============================================================================
// Role Fixtures
// =============================================================================

/// Fixture providing standard roles.
pub struct RoleFixtures;

impl RoleFixtures {
    /// The administrator role (id 1, code `ADMIN`).
    pub fn admin() -> Role {
        Role::new(1, "ADMIN", "Administrator")
    }

    /// A branch manager role (id 7, code `MANAGER`).
    pub fn manager() -> Role {
        Role::new(7, "MANAGER", "Branch Manager").with_description("Runs one branch")
    }

    /// A read-only role (id 9, code `VIEWER`).
    pub fn viewer() -> Role {
        Role::new(9, "VIEWER", "Viewer")
    }

    /// A retired role (id 12, code `LEGACY`, inactive).
    pub fn retired() -> Role {
        Role::new(12, "LEGACY", "Legacy Staff").with_status(RoleStatus::Inactive)
    }

    /// All standard roles.
    pub fn all() -> Vec<Role> {
        vec![Self::admin(), Self::manager(), Self::viewer(), Self::retired()]
    }
}

// =============================================================================
// Session Fixtures
// =============================================================================

/// Fixture providing standard session users and providers.
pub struct SessionFixtures;

impl SessionFixtures {
    /// A signed-in administrator.
    pub fn admin_user() -> SessionUser {
        SessionUser::new("u-admin")
            .with_email("admin@example.com")
            .with_role(1, "ADMIN")
    }

    /// A signed-in branch manager.
    pub fn manager_user() -> SessionUser {
        SessionUser::new("u-manager")
            .with_email("manager@example.com")
            .with_role(7, "MANAGER")
    }

    /// A signed-in viewer.
    pub fn viewer_user() -> SessionUser {
        SessionUser::new("u-viewer").with_role(9, "VIEWER")
    }

    /// A signed-in user with no role assignment.
    pub fn roleless_user() -> SessionUser {
        SessionUser::new("u-roleless").with_email("new-hire@example.com")
    }

    /// A provider with the given user signed in.
    pub fn provider_for(user: SessionUser) -> StaticSessionProvider {
        let provider = StaticSessionProvider::anonymous();
        provider.set_user(user);
        provider
    }
}

// =============================================================================
// Directory Fixtures
// =============================================================================

/// Fixture providing pre-seeded in-memory directories.
pub struct DirectoryFixtures;

impl DirectoryFixtures {
    /// A directory holding the standard catalog and roles, with no grants.
    pub fn empty_grants() -> MemoryDirectory {
        let directory = MemoryDirectory::with_catalog(CatalogFixtures::standard());
        directory.set_roles(RoleFixtures::all());
        directory
    }

    /// The standard scenario: manager (role 7) holds rooms view (1) and
    /// rooms update (3); viewer (role 9) holds view on every module.
    pub fn seeded() -> MemoryDirectory {
        let directory = Self::empty_grants();
        directory.seed_grants(
            RoleId::new(7),
            &[PermissionActionId::new(1), PermissionActionId::new(3)],
        );
        directory.seed_grants(
            RoleId::new(9),
            &[1, 10, 20, 30, 40, 50]
                .into_iter()
                .map(PermissionActionId::new)
                .collect::<Vec<_>>(),
        );
        directory
    }
}
