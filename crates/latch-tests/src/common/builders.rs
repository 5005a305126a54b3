// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builder patterns for constructing complex test objects with sensible defaults.
//!
//! ## Design Principles
//!
//! - Type-safe construction with compile-time guarantees
//! - Sensible defaults for common test scenarios
//! - Chainable methods for fluent API
//! - Clear separation between required and optional fields

use latch_core::types::{
    ActionKey, ModuleEntry, PermissionAction, PermissionActionId, Role, RoleStatus,
};
use latch_directory::MemoryDirectory;

// =============================================================================
// Module Builder
// =============================================================================

/// Builder for constructing [`ModuleEntry`] instances with sequential sort
/// orders.
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    code: String,
    name: String,
    group_label: Option<String>,
    actions: Vec<(PermissionActionId, ActionKey, Option<String>)>,
}

impl ModuleBuilder {
    /// Create a new builder.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            group_label: None,
            actions: Vec::new(),
        }
    }

    /// Set the group label.
    pub fn group(mut self, label: impl Into<String>) -> Self {
        self.group_label = Some(label.into());
        self
    }

    /// Add an action with a label derived from the key.
    pub fn action(mut self, id: i64, key: ActionKey) -> Self {
        self.actions.push((PermissionActionId::new(id), key, None));
        self
    }

    /// Add an action with an explicit display label.
    pub fn labeled_action(mut self, id: i64, key: ActionKey, label: impl Into<String>) -> Self {
        self.actions
            .push((PermissionActionId::new(id), key, Some(label.into())));
        self
    }

    /// Add all four actions with ids `base`, `base+1`, `base+2`, `base+3`.
    pub fn full_crud(self, base: i64) -> Self {
        self.action(base, ActionKey::View)
            .action(base + 1, ActionKey::Create)
            .action(base + 2, ActionKey::Update)
            .action(base + 3, ActionKey::Delete)
    }

    /// Build the module entry. Sort orders follow insertion order.
    pub fn build(self) -> ModuleEntry {
        let mut module = ModuleEntry::new(self.code, self.name);
        if let Some(label) = self.group_label {
            module = module.with_group_label(label);
        }
        for (index, (id, key, label)) in self.actions.into_iter().enumerate() {
            let label = label.unwrap_or_else(|| key.as_str().to_string());
            module = module
                .with_action(PermissionAction::new(id, key, label).with_sort_order(index as i32 + 1));
        }
        module
    }
}

// =============================================================================
// Catalog Builder
// =============================================================================

/// Builder for whole catalogs.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    modules: Vec<ModuleEntry>,
}

impl CatalogBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished module entry.
    pub fn module(mut self, module: ModuleEntry) -> Self {
        self.modules.push(module);
        self
    }

    /// Add a module via its builder.
    pub fn with(self, builder: ModuleBuilder) -> Self {
        self.module(builder.build())
    }

    /// Build the catalog.
    pub fn build(self) -> Vec<ModuleEntry> {
        self.modules
    }

    /// Build the catalog into a seeded in-memory directory.
    pub fn into_directory(self) -> MemoryDirectory {
        MemoryDirectory::with_catalog(self.build())
    }
}

// =============================================================================
// Role Builder
// =============================================================================

/// Builder for constructing [`Role`] instances.
#[derive(Debug, Clone)]
pub struct RoleBuilder {
    id: i64,
    code: String,
    name: Option<String>,
    description: Option<String>,
    status: RoleStatus,
}

impl RoleBuilder {
    /// Create a new builder.
    pub fn new(id: i64, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: None,
            description: None,
            status: RoleStatus::Active,
        }
    }

    /// Set the display name. Defaults to the code.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the role inactive.
    pub fn inactive(mut self) -> Self {
        self.status = RoleStatus::Inactive;
        self
    }

    /// Build the role.
    pub fn build(self) -> Role {
        let name = self.name.unwrap_or_else(|| self.code.clone());
        let mut role = Role::new(self.id, self.code, name).with_status(self.status);
        if let Some(description) = self.description {
            role = role.with_description(description);
        }
        role
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_builder_assigns_sort_orders() {
        let module = ModuleBuilder::new("rooms", "Rooms")
            .action(2, ActionKey::Create)
            .action(1, ActionKey::View)
            .build();

        assert_eq!(module.actions[0].sort_order, 1);
        assert_eq!(module.actions[1].sort_order, 2);
        assert_eq!(module.actions[0].key, ActionKey::Create);
    }

    #[test]
    fn test_module_builder_full_crud() {
        let module = ModuleBuilder::new("rooms", "Rooms").full_crud(100).build();
        assert_eq!(module.actions.len(), 4);
        assert_eq!(
            module.action(ActionKey::Delete).map(|a| a.id.get()),
            Some(103)
        );
    }

    #[test]
    fn test_catalog_builder() {
        let catalog = CatalogBuilder::new()
            .with(ModuleBuilder::new("rooms", "Rooms").action(1, ActionKey::View))
            .with(ModuleBuilder::new("branches", "Branches").group("Operations"))
            .build();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1].group_label.as_deref(), Some("Operations"));
    }

    #[test]
    fn test_role_builder_defaults() {
        let role = RoleBuilder::new(7, "MANAGER").build();
        assert_eq!(role.name, "MANAGER");
        assert!(role.is_active());

        let role = RoleBuilder::new(12, "LEGACY")
            .name("Legacy Staff")
            .description("Retired")
            .inactive()
            .build();
        assert!(!role.is_active());
        assert_eq!(role.description.as_deref(), Some("Retired"));
    }
}
