// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The permission catalog: the fixed universe of modules and their actions.
//!
//! A [`Catalog`] owns an ordered module list plus two indices: (module code,
//! action key) to action id, and action id back to its (module, key) slot.
//! The indices back the grant matrix layout and the client-side join of
//! grant edges against the catalog.
//!
//! # Example
//!
//! ```
//! use latch_core::catalog::Catalog;
//! use latch_core::types::{ActionKey, ModuleEntry, PermissionAction};
//!
//! let catalog = Catalog::new(vec![ModuleEntry::new("rooms", "Rooms")
//!     .with_action(PermissionAction::new(1, ActionKey::View, "View"))]);
//!
//! assert_eq!(
//!     catalog.action_id("rooms", ActionKey::View).map(|id| id.get()),
//!     Some(1)
//! );
//! assert!(catalog.action_id("rooms", ActionKey::Delete).is_none());
//! ```

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::types::{ActionKey, ModuleCode, ModuleEntry, PermissionActionId};

/// The fixed universe of modules and their actions.
///
/// Modules are held sorted by code ascending and each module's actions by
/// `sort_order` ascending. The catalog is effectively read-only after
/// construction; reloads build a fresh instance rather than patching.
/// Serializes as its module list only; the indices are rebuilt via
/// [`Catalog::new`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    /// Modules sorted by code ascending.
    modules: Vec<ModuleEntry>,

    /// (module code, action key) → action id.
    #[serde(skip)]
    by_module: HashMap<ModuleCode, HashMap<ActionKey, PermissionActionId>>,

    /// action id → (module code, action key).
    #[serde(skip)]
    by_id: HashMap<PermissionActionId, (ModuleCode, ActionKey)>,
}

impl Catalog {
    /// Builds a catalog from module entries.
    ///
    /// Sorts modules by code and actions by sort order, then indexes every
    /// action id. A duplicate (module, key) pair or a reused action id
    /// violates the catalog's 1:1 mapping; the first occurrence wins and the
    /// duplicate is logged.
    pub fn new(mut modules: Vec<ModuleEntry>) -> Self {
        modules.sort_by(|a, b| a.code.cmp(&b.code));
        for module in &mut modules {
            module.sort_actions();
        }

        let mut by_module: HashMap<ModuleCode, HashMap<ActionKey, PermissionActionId>> =
            HashMap::new();
        let mut by_id: HashMap<PermissionActionId, (ModuleCode, ActionKey)> = HashMap::new();

        for module in &modules {
            let slots = by_module.entry(module.code.clone()).or_default();
            for action in &module.actions {
                if slots.contains_key(&action.key) {
                    warn!(
                        module = %module.code,
                        action = %action.key,
                        "Duplicate catalog entry for (module, action), keeping first"
                    );
                    continue;
                }
                if let Some((other_module, other_key)) = by_id.get(&action.id) {
                    warn!(
                        action_id = %action.id,
                        module = %module.code,
                        action = %action.key,
                        conflicts_with_module = %other_module,
                        conflicts_with_action = %other_key,
                        "Action id reused across catalog entries, keeping first"
                    );
                    continue;
                }
                slots.insert(action.key, action.id);
                by_id.insert(action.id, (module.code.clone(), action.key));
            }
        }

        Self {
            modules,
            by_module,
            by_id,
        }
    }

    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the modules, sorted by code ascending.
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    /// Looks up a module entry by code.
    pub fn module(&self, code: &str) -> Option<&ModuleEntry> {
        self.modules
            .binary_search_by(|m| m.code.as_str().cmp(code))
            .ok()
            .map(|idx| &self.modules[idx])
    }

    /// Resolves a (module code, action key) pair to its action id.
    pub fn action_id(&self, module: &str, key: ActionKey) -> Option<PermissionActionId> {
        self.by_module.get(module)?.get(&key).copied()
    }

    /// Resolves an action id back to its (module code, action key) slot.
    pub fn locate(&self, id: PermissionActionId) -> Option<(&ModuleCode, ActionKey)> {
        self.by_id.get(&id).map(|(code, key)| (code, *key))
    }

    /// Returns `true` if the id belongs to a catalog action.
    #[inline]
    pub fn contains_action_id(&self, id: PermissionActionId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Returns every action id of the catalog, in module/action order.
    pub fn all_action_ids(&self) -> Vec<PermissionActionId> {
        self.modules
            .iter()
            .flat_map(|m| m.actions.iter().map(|a| a.id))
            .collect()
    }

    /// Returns the number of modules.
    #[inline]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Returns the total number of actions across all modules.
    pub fn action_count(&self) -> usize {
        self.modules.iter().map(|m| m.actions.len()).sum()
    }

    /// Returns `true` if the catalog holds no modules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl From<Vec<ModuleEntry>> for Catalog {
    fn from(modules: Vec<ModuleEntry>) -> Self {
        Self::new(modules)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PermissionAction;

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            ModuleEntry::new("rooms", "Rooms")
                .with_action(PermissionAction::new(3, ActionKey::Update, "Update").with_sort_order(3))
                .with_action(PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1))
                .with_action(PermissionAction::new(2, ActionKey::Create, "Create").with_sort_order(2)),
            ModuleEntry::new("branches", "Branches")
                .with_action(PermissionAction::new(10, ActionKey::View, "View").with_sort_order(1)),
        ])
    }

    #[test]
    fn test_modules_sorted_by_code() {
        let catalog = sample_catalog();
        let codes: Vec<&str> = catalog.modules().iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["branches", "rooms"]);
    }

    #[test]
    fn test_actions_sorted_within_module() {
        let catalog = sample_catalog();
        let rooms = catalog.module("rooms").unwrap();
        let keys: Vec<ActionKey> = rooms.actions.iter().map(|a| a.key).collect();
        assert_eq!(keys, vec![ActionKey::View, ActionKey::Create, ActionKey::Update]);
    }

    #[test]
    fn test_action_id_lookup() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.action_id("rooms", ActionKey::Create),
            Some(PermissionActionId::new(2))
        );
        assert_eq!(catalog.action_id("rooms", ActionKey::Delete), None);
        assert_eq!(catalog.action_id("unknown", ActionKey::View), None);
    }

    #[test]
    fn test_locate_reverse_lookup() {
        let catalog = sample_catalog();
        let (code, key) = catalog.locate(PermissionActionId::new(10)).unwrap();
        assert_eq!(code.as_str(), "branches");
        assert_eq!(key, ActionKey::View);

        assert!(catalog.locate(PermissionActionId::new(999)).is_none());
    }

    #[test]
    fn test_contains_action_id() {
        let catalog = sample_catalog();
        assert!(catalog.contains_action_id(PermissionActionId::new(1)));
        assert!(!catalog.contains_action_id(PermissionActionId::new(999)));
    }

    #[test]
    fn test_all_action_ids_deterministic_order() {
        let catalog = sample_catalog();
        let ids: Vec<i64> = catalog.all_action_ids().iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![10, 1, 2, 3]);
    }

    #[test]
    fn test_counts() {
        let catalog = sample_catalog();
        assert_eq!(catalog.module_count(), 2);
        assert_eq!(catalog.action_count(), 4);
        assert!(!catalog.is_empty());
        assert!(Catalog::empty().is_empty());
    }

    #[test]
    fn test_duplicate_pair_keeps_first() {
        let catalog = Catalog::new(vec![ModuleEntry::new("rooms", "Rooms")
            .with_action(PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1))
            .with_action(PermissionAction::new(5, ActionKey::View, "View again").with_sort_order(2))]);

        assert_eq!(
            catalog.action_id("rooms", ActionKey::View),
            Some(PermissionActionId::new(1))
        );
        assert!(!catalog.contains_action_id(PermissionActionId::new(5)));
    }

    #[test]
    fn test_reused_id_keeps_first() {
        let catalog = Catalog::new(vec![
            ModuleEntry::new("branches", "Branches")
                .with_action(PermissionAction::new(1, ActionKey::View, "View")),
            ModuleEntry::new("rooms", "Rooms")
                .with_action(PermissionAction::new(1, ActionKey::Create, "Create")),
        ]);

        let (code, key) = catalog.locate(PermissionActionId::new(1)).unwrap();
        assert_eq!(code.as_str(), "branches");
        assert_eq!(key, ActionKey::View);
        assert_eq!(catalog.action_id("rooms", ActionKey::Create), None);
    }
}
