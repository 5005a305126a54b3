// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory permission directory.
//!
//! [`MemoryDirectory`] keeps the catalog, roles, and grant sets in process
//! memory behind `parking_lot` locks. It honors the same ordering and
//! normalization contract as the REST backend, which makes it the directory
//! of choice for tests and offline CLI runs.
//!
//! # Example
//!
//! ```rust
//! use latch_directory::memory::MemoryDirectory;
//! use latch_core::types::{ActionKey, ModuleEntry, PermissionAction, PermissionActionId};
//!
//! let directory = MemoryDirectory::new();
//! directory.set_catalog(vec![ModuleEntry::new("rooms", "Rooms").with_action(
//!     PermissionAction::new(PermissionActionId::new(1), ActionKey::View, "View"),
//! )]);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use latch_core::error::{DirectoryError, DirectoryResult};
use latch_core::types::{ModuleEntry, ModuleGrants, PermissionActionId, Role, RoleId};

use crate::traits::{
    join_role_grants, normalize_action_ids, report_unknown_ids, DirectoryStats,
    DirectoryStatsInner, PermissionDirectory,
};

// ============================================================================
// Memory Directory
// ============================================================================

/// Permission directory held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    /// Module catalog.
    catalog: RwLock<Vec<ModuleEntry>>,

    /// Known roles.
    roles: RwLock<Vec<Role>>,

    /// Grant sets keyed by role id.
    grants: RwLock<HashMap<RoleId, BTreeSet<PermissionActionId>>>,

    /// Operation counters.
    stats: DirectoryStatsInner,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-seeded with a catalog.
    pub fn with_catalog(modules: Vec<ModuleEntry>) -> Self {
        let directory = Self::new();
        directory.set_catalog(modules);
        directory
    }

    /// Replaces the module catalog.
    pub fn set_catalog(&self, modules: Vec<ModuleEntry>) {
        *self.catalog.write() = modules;
    }

    /// Replaces the role list.
    pub fn set_roles(&self, roles: Vec<Role>) {
        *self.roles.write() = roles;
    }

    /// Adds a single role.
    pub fn insert_role(&self, role: Role) {
        self.roles.write().push(role);
    }

    /// Seeds a role's grant set directly, bypassing normalization.
    pub fn seed_grants(&self, role_id: RoleId, action_ids: &[PermissionActionId]) {
        self.grants
            .write()
            .insert(role_id, action_ids.iter().copied().collect());
    }

    /// Number of grants currently held for a role.
    pub fn grant_count(&self, role_id: RoleId) -> usize {
        self.grants
            .read()
            .get(&role_id)
            .map(BTreeSet::len)
            .unwrap_or(0)
    }

    fn sorted_catalog(&self) -> Vec<ModuleEntry> {
        let mut modules = self.catalog.read().clone();
        for module in &mut modules {
            module.sort_actions();
        }
        modules.sort_by(|a, b| a.code.cmp(&b.code));
        modules
    }
}

#[async_trait]
impl PermissionDirectory for MemoryDirectory {
    async fn list_modules(&self) -> DirectoryResult<Vec<ModuleEntry>> {
        let modules = self.sorted_catalog();
        self.stats.record_catalog_read();
        Ok(modules)
    }

    async fn list_roles(&self) -> DirectoryResult<Vec<Role>> {
        let mut roles = self.roles.read().clone();
        roles.sort_by(|a, b| a.code.cmp(&b.code));
        self.stats.record_role_read();
        Ok(roles)
    }

    async fn role_permissions(
        &self,
        role_id: Option<RoleId>,
    ) -> DirectoryResult<Vec<ModuleGrants>> {
        let id = match role_id {
            Some(id) if id.is_valid() => id,
            _ => {
                debug!("No usable role selected, returning empty grant matrix");
                return Ok(Vec::new());
            }
        };

        let modules = self.sorted_catalog();
        self.stats.record_catalog_read();

        let granted: HashSet<PermissionActionId> = self
            .grants
            .read()
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        self.stats.record_grant_read();

        let (rows, unknown) = join_role_grants(&modules, &granted);
        report_unknown_ids(&self.stats, id, &unknown);
        Ok(rows)
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        action_ids: &[PermissionActionId],
    ) -> DirectoryResult<()> {
        if !role_id.is_valid() {
            return Err(DirectoryError::invalid_role(role_id.get()));
        }

        let ids = normalize_action_ids(action_ids);
        let mut grants = self.grants.write();
        if ids.is_empty() {
            grants.remove(&role_id);
        } else {
            grants.insert(role_id, ids.into_iter().collect());
        }

        self.stats.record_replace_write();
        debug!(role_id = role_id.get(), "Role grant set replaced in memory");
        Ok(())
    }

    fn stats(&self) -> DirectoryStats {
        self.stats.snapshot()
    }
}

// ============================================================================
// Tests
// ============================================================================
