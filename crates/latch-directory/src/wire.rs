// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Wire-format rows exchanged with the REST backend.
//!
//! These types mirror the backend tables column-for-column and convert into
//! the domain types from `latch-core`. Conversions are lossy on purpose:
//! rows carrying action keys the console does not know are dropped with a
//! warning instead of failing the whole read.

use serde::{Deserialize, Serialize};
use tracing::warn;

use latch_core::types::{
    ActionKey, ModuleEntry, PermissionAction, PermissionActionId, Role, RoleStatus,
};

// ============================================================================
// Catalog Rows
// ============================================================================

/// One row of the `permission_modules` table with its embedded actions.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRow {
    /// Stable module code
    pub module_code: String,
    /// Display name
    pub module_name: String,
    /// Optional section label
    #[serde(default)]
    pub group_label: Option<String>,
    /// Embedded `permission_actions` rows
    #[serde(default)]
    pub permission_actions: Vec<ActionRow>,
}

/// One row of the `permission_actions` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRow {
    /// Numeric action id
    pub permission_action_id: i64,
    /// Action key (`view`, `create`, `update`, `delete`)
    pub action_key: String,
    /// Optional display label; the key is used when absent
    #[serde(default)]
    pub action_label: Option<String>,
    /// Ordering within the module
    #[serde(default)]
    pub sort_order: i32,
}

impl ActionRow {
    /// Convert into a domain action. Returns `None` for unknown keys.
    pub fn into_action(self) -> Option<PermissionAction> {
        match ActionKey::parse(&self.action_key) {
            Some(key) => {
                let label = self
                    .action_label
                    .unwrap_or_else(|| self.action_key.clone());
                let id = PermissionActionId::new(self.permission_action_id);
                Some(PermissionAction::new(id, key, label).with_sort_order(self.sort_order))
            }
            None => {
                warn!(
                    action_id = self.permission_action_id,
                    action_key = %self.action_key,
                    "Dropping action row with unknown key"
                );
                None
            }
        }
    }
}

impl ModuleRow {
    /// Convert into a domain module entry, dropping unknown action rows.
    pub fn into_entry(self) -> ModuleEntry {
        let mut entry = ModuleEntry::new(self.module_code, self.module_name);
        entry.group_label = self.group_label;
        entry.actions = self
            .permission_actions
            .into_iter()
            .filter_map(ActionRow::into_action)
            .collect();
        entry.sort_actions();
        entry
    }
}

// ============================================================================
// Grant Rows
// ============================================================================

/// One row of the `role_permission_actions` junction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRow {
    /// Role holding the grant
    pub role_id: i64,
    /// Granted action
    pub permission_action_id: i64,
}

impl GrantRow {
    /// Create a junction row for insertion.
    pub fn new(role_id: i64, permission_action_id: i64) -> Self {
        Self {
            role_id,
            permission_action_id,
        }
    }

    /// The granted action id as a domain id.
    pub fn action_id(&self) -> PermissionActionId {
        PermissionActionId::new(self.permission_action_id)
    }
}

// ============================================================================
// Role Rows
// ============================================================================

/// One row of the `roles` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRow {
    /// Numeric role id
    pub role_id: i64,
    /// Stable role code
    pub role_code: String,
    /// Display name
    pub role_name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Lifecycle status; unknown values map to inactive
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "active".to_string()
}

impl RoleRow {
    /// Convert into a domain role.
    ///
    /// Unknown status strings map to [`RoleStatus::Inactive`] so a role with
    /// an unrecognized lifecycle never grants anything by accident.
    pub fn into_role(self) -> Role {
        let status = RoleStatus::parse(&self.status.to_lowercase()).unwrap_or_else(|| {
            warn!(
                role_id = self.role_id,
                status = %self.status,
                "Unknown role status, treating as inactive"
            );
            RoleStatus::Inactive
        });
        let mut role = Role::new(self.role_id, self.role_code, self.role_name);
        role.description = self.description;
        role.status = status;
        role
    }
}

// ============================================================================
// Tests
// ============================================================================
