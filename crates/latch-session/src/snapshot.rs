// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Immutable permission snapshots.
//!
//! A [`PermissionSnapshot`] is what the cache hands to capability checks:
//! either the admin bypass, from which every check answers `true`, or a
//! scoped map from module code to granted actions. Snapshots are replaced
//! wholesale on every load; nothing ever mutates one in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use latch_core::types::{ActionKey, ActionSet, ModuleCode, ModuleGrants};

// ============================================================================
// Permission Snapshot
// ============================================================================

/// The effective permissions of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "grants", rename_all = "lowercase")]
pub enum PermissionSnapshot {
    /// Administrator session: every check answers `true`.
    Admin,

    /// Regular session: checks answer from the granted action map.
    Scoped(HashMap<ModuleCode, ActionSet>),
}

impl PermissionSnapshot {
    /// The admin bypass snapshot.
    pub fn admin() -> Self {
        Self::Admin
    }

    /// A deny-all snapshot.
    pub fn empty() -> Self {
        Self::Scoped(HashMap::new())
    }

    /// A scoped snapshot over an explicit grant map.
    pub fn scoped(grants: HashMap<ModuleCode, ActionSet>) -> Self {
        Self::Scoped(grants)
    }

    /// Builds a scoped snapshot from joined grant rows.
    ///
    /// Modules with no assigned actions are omitted; they deny everything
    /// either way.
    pub fn from_grants(rows: &[ModuleGrants]) -> Self {
        let mut grants = HashMap::new();
        for row in rows {
            let keys = row.assigned_keys();
            if !keys.is_empty() {
                grants.insert(row.code.clone(), keys);
            }
        }
        Self::Scoped(grants)
    }

    /// Returns `true` for the admin bypass.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Answers one capability check.
    ///
    /// An empty module code is always denied, admin or not.
    pub fn allows(&self, module: &str, action: ActionKey) -> bool {
        if module.is_empty() {
            return false;
        }
        match self {
            Self::Admin => true,
            Self::Scoped(grants) => grants
                .get(module)
                .map(|actions| actions.contains(action))
                .unwrap_or(false),
        }
    }

    /// Convenience check for the default `view` action.
    #[inline]
    pub fn allows_view(&self, module: &str) -> bool {
        self.allows(module, ActionKey::View)
    }

    /// Number of modules carrying at least one grant. Admin reports 0.
    pub fn module_count(&self) -> usize {
        match self {
            Self::Admin => 0,
            Self::Scoped(grants) => grants.len(),
        }
    }

    /// Returns `true` if the snapshot denies everything.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Admin => false,
            Self::Scoped(grants) => grants.is_empty(),
        }
    }

    /// Module codes carrying grants, sorted for stable output.
    pub fn granted_modules(&self) -> Vec<&str> {
        match self {
            Self::Admin => Vec::new(),
            Self::Scoped(grants) => {
                let mut codes: Vec<&str> = grants.keys().map(|c| c.as_str()).collect();
                codes.sort_unstable();
                codes
            }
        }
    }
}

impl Default for PermissionSnapshot {
    /// The default snapshot denies everything.
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use latch_core::types::{ActionAssignment, PermissionAction, PermissionActionId};

    fn grants_row(code: &str, assigned: &[(i64, ActionKey, bool)]) -> ModuleGrants {
        ModuleGrants {
            code: ModuleCode::new(code),
            name: code.to_uppercase(),
            group_label: None,
            actions: assigned
                .iter()
                .map(|(id, key, on)| {
                    ActionAssignment::new(
                        PermissionAction::new(PermissionActionId::new(*id), *key, key.as_str()),
                        *on,
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_admin_allows_everything() {
        let snapshot = PermissionSnapshot::admin();
        assert!(snapshot.is_admin());
        assert!(!snapshot.is_empty());
        assert!(snapshot.allows("rooms", ActionKey::Delete));
        assert!(snapshot.allows("never-seen", ActionKey::View));
    }

    #[test]
    fn test_empty_denies_everything() {
        let snapshot = PermissionSnapshot::empty();
        assert!(snapshot.is_empty());
        assert!(!snapshot.allows("rooms", ActionKey::View));
    }

    #[test]
    fn test_scoped_answers_from_grants() {
        let rows = vec![
            grants_row(
                "rooms",
                &[(1, ActionKey::View, true), (2, ActionKey::Update, false)],
            ),
            grants_row("branches", &[(10, ActionKey::View, false)]),
        ];
        let snapshot = PermissionSnapshot::from_grants(&rows);

        assert!(snapshot.allows("rooms", ActionKey::View));
        assert!(snapshot.allows_view("rooms"));
        assert!(!snapshot.allows("rooms", ActionKey::Update));
        assert!(!snapshot.allows("branches", ActionKey::View));
        assert!(!snapshot.allows("billing", ActionKey::View));
    }

    #[test]
    fn test_from_grants_omits_empty_modules() {
        let rows = vec![
            grants_row("rooms", &[(1, ActionKey::View, true)]),
            grants_row("branches", &[(10, ActionKey::View, false)]),
        ];
        let snapshot = PermissionSnapshot::from_grants(&rows);
        assert_eq!(snapshot.module_count(), 1);
        assert_eq!(snapshot.granted_modules(), vec!["rooms"]);
    }

    #[test]
    fn test_default_is_deny_all() {
        assert!(PermissionSnapshot::default().is_empty());
    }

    #[test]
    fn test_snapshot_serde_roundtrip() {
        let rows = vec![grants_row("rooms", &[(1, ActionKey::View, true)])];
        let snapshot = PermissionSnapshot::from_grants(&rows);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"kind\":\"scoped\""));
        let back: PermissionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        let admin = serde_json::to_string(&PermissionSnapshot::Admin).unwrap();
        assert!(admin.contains("\"kind\":\"admin\""));
    }
}
