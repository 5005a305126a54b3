// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for LATCH.
//!
//! This module provides the domain types shared by every LATCH component:
//! identifiers, the fixed action vocabulary, catalog entries, roles, grant
//! edges, and the annotated per-role grant view.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a permission module.
///
/// Module codes are stable, lowercase identifiers assigned at schema setup
/// (e.g. `rooms`, `branches`) and never change for the lifetime of the system.
///
/// # Examples
///
/// ```
/// use latch_core::types::ModuleCode;
///
/// let code = ModuleCode::new("rooms");
/// assert_eq!(code.as_str(), "rooms");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCode(String);

impl ModuleCode {
    /// Creates a new module code.
    #[inline]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns `true` if the code is the empty string.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ModuleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModuleCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Allows `HashMap<ModuleCode, _>` lookups by `&str` without allocating.
impl Borrow<str> for ModuleCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An immutable role code (e.g. `ADMIN`, `MANAGER`).
///
/// The code identifies a role independently of its numeric id and is the
/// value compared against the administrator sentinel for the admin bypass.
///
/// # Examples
///
/// ```
/// use latch_core::types::RoleCode;
///
/// let code = RoleCode::new("MANAGER");
/// assert_eq!(code.as_str(), "MANAGER");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCode(String);

impl RoleCode {
    /// Creates a new role code.
    #[inline]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RoleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The stable numeric identifier of one (module, action) catalog entry.
///
/// This id, not the (module, action) pair, is the unit of grant and revoke:
/// the catalog guarantees a 1:1 stable mapping between the two for the
/// lifetime of the system. Only positive values are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionActionId(i64);

impl PermissionActionId {
    /// Creates a new action id.
    #[inline]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    #[inline]
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Returns `true` if the id is a valid (positive) identifier.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for PermissionActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PermissionActionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The numeric identifier of a role. Only positive values are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a new role id.
    #[inline]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    #[inline]
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Returns `true` if the id is a valid (positive) identifier.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RoleId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// =============================================================================
// Action Vocabulary
// =============================================================================

/// The fixed action vocabulary applied to every module.
///
/// The variant order is the canonical column order of the grant matrix and
/// of every serialized action listing.
///
/// # Examples
///
/// ```
/// use latch_core::types::ActionKey;
///
/// assert_eq!(ActionKey::View.as_str(), "view");
/// assert_eq!(ActionKey::parse("delete"), Some(ActionKey::Delete));
/// assert_eq!(ActionKey::all().len(), 4);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ActionKey {
    /// Read access to a module's screens and data.
    #[default]
    View,

    /// Creating new records within a module.
    Create,

    /// Editing existing records within a module.
    Update,

    /// Deleting records within a module.
    Delete,
}

impl ActionKey {
    /// Returns the action key as the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKey::View => "view",
            ActionKey::Create => "create",
            ActionKey::Update => "update",
            ActionKey::Delete => "delete",
        }
    }

    /// Parses an action key from its wire string.
    ///
    /// Returns `None` for anything outside the fixed vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(ActionKey::View),
            "create" => Some(ActionKey::Create),
            "update" => Some(ActionKey::Update),
            "delete" => Some(ActionKey::Delete),
            _ => None,
        }
    }

    /// Returns all action keys in canonical order.
    pub fn all() -> [ActionKey; 4] {
        [
            ActionKey::View,
            ActionKey::Create,
            ActionKey::Update,
            ActionKey::Delete,
        ]
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A set of action keys with set semantics (no duplicates, unordered).
///
/// # Examples
///
/// ```
/// use latch_core::types::{ActionKey, ActionSet};
///
/// let mut set = ActionSet::new();
/// set.add(ActionKey::View);
/// set.add(ActionKey::Update);
///
/// assert!(set.contains(ActionKey::View));
/// assert!(!set.contains(ActionKey::Delete));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet {
    actions: HashSet<ActionKey>,
}

impl ActionSet {
    /// Creates an empty action set.
    pub fn new() -> Self {
        Self {
            actions: HashSet::new(),
        }
    }

    /// Creates a set containing every action in the vocabulary.
    pub fn all() -> Self {
        Self {
            actions: ActionKey::all().into_iter().collect(),
        }
    }

    /// Adds an action to the set. Returns `true` if it was not already present.
    pub fn add(&mut self, action: ActionKey) -> bool {
        self.actions.insert(action)
    }

    /// Removes an action from the set. Returns `true` if it was present.
    pub fn remove(&mut self, action: ActionKey) -> bool {
        self.actions.remove(&action)
    }

    /// Returns `true` if the set contains the action.
    #[inline]
    pub fn contains(&self, action: ActionKey) -> bool {
        self.actions.contains(&action)
    }

    /// Returns `true` if the set contains every given action.
    pub fn contains_all(&self, actions: &[ActionKey]) -> bool {
        actions.iter().all(|a| self.actions.contains(a))
    }

    /// Returns `true` if the set contains any of the given actions.
    pub fn contains_any(&self, actions: &[ActionKey]) -> bool {
        actions.iter().any(|a| self.actions.contains(a))
    }

    /// Merges another set into this one.
    pub fn merge(&mut self, other: &ActionSet) {
        self.actions.extend(other.actions.iter().copied());
    }

    /// Returns the number of actions in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over the actions in the set (unordered).
    pub fn iter(&self) -> impl Iterator<Item = ActionKey> + '_ {
        self.actions.iter().copied()
    }

    /// Returns the actions in canonical order, for stable display.
    pub fn to_sorted_vec(&self) -> Vec<ActionKey> {
        let mut v: Vec<ActionKey> = self.actions.iter().copied().collect();
        v.sort();
        v
    }
}

impl FromIterator<ActionKey> for ActionSet {
    fn from_iter<I: IntoIterator<Item = ActionKey>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ActionKey>> for ActionSet {
    fn from(actions: Vec<ActionKey>) -> Self {
        actions.into_iter().collect()
    }
}

// =============================================================================
// Catalog Entries
// =============================================================================

/// One concrete action within a module's catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionAction {
    /// The stable grant/revoke identifier.
    pub id: PermissionActionId,

    /// Which of the four actions this entry represents.
    pub key: ActionKey,

    /// Display label for the matrix column cell.
    pub label: String,

    /// Sort position within the module's action list.
    pub sort_order: i32,
}

impl PermissionAction {
    /// Creates a new catalog action.
    pub fn new(id: impl Into<PermissionActionId>, key: ActionKey, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key,
            label: label.into(),
            sort_order: 0,
        }
    }

    /// Sets the sort position.
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A module catalog entry: one functional area and its available actions.
///
/// Not every module supports all four actions; `actions` holds exactly the
/// defined ones, ordered by `sort_order` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Unique module code.
    pub code: ModuleCode,

    /// Display name.
    pub name: String,

    /// Optional section label for UI clustering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,

    /// The actions defined for this module.
    pub actions: Vec<PermissionAction>,
}

impl ModuleEntry {
    /// Creates a new module entry with no actions.
    pub fn new(code: impl Into<ModuleCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            group_label: None,
            actions: Vec::new(),
        }
    }

    /// Sets the group label.
    pub fn with_group_label(mut self, label: impl Into<String>) -> Self {
        self.group_label = Some(label.into());
        self
    }

    /// Appends an action.
    pub fn with_action(mut self, action: PermissionAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Looks up the action for a key, if this module defines it.
    pub fn action(&self, key: ActionKey) -> Option<&PermissionAction> {
        self.actions.iter().find(|a| a.key == key)
    }

    /// Returns `true` if this module defines the action.
    #[inline]
    pub fn has_action(&self, key: ActionKey) -> bool {
        self.action(key).is_some()
    }

    /// Returns the ids of every defined action, in sort order.
    pub fn action_ids(&self) -> Vec<PermissionActionId> {
        self.actions.iter().map(|a| a.id).collect()
    }

    /// Sorts the action list by `sort_order` ascending.
    pub fn sort_actions(&mut self) {
        self.actions.sort_by_key(|a| a.sort_order);
    }
}

// =============================================================================
// Roles
// =============================================================================

/// The lifecycle status of a role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    /// The role can be assigned to users.
    #[default]
    Active,

    /// The role is retired but its grants are retained.
    Inactive,
}

impl RoleStatus {
    /// Returns the status as the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleStatus::Active => "active",
            RoleStatus::Inactive => "inactive",
        }
    }

    /// Parses a status from its wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RoleStatus::Active),
            "inactive" => Some(RoleStatus::Inactive),
            _ => None,
        }
    }

    /// Returns `true` if the role is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, RoleStatus::Active)
    }
}

impl fmt::Display for RoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role: the unit of grant assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Numeric identifier.
    pub id: RoleId,

    /// Immutable role code.
    pub code: RoleCode,

    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lifecycle status.
    #[serde(default)]
    pub status: RoleStatus,
}

impl Role {
    /// Creates a new active role.
    pub fn new(id: impl Into<RoleId>, code: impl Into<RoleCode>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            description: None,
            status: RoleStatus::Active,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: RoleStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns `true` if the role is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// =============================================================================
// Grants
// =============================================================================

/// One grant edge: "this role may perform this catalog action".
///
/// The full grant set of a role is a set of such edges; absence means denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    /// The granted role.
    pub role_id: RoleId,

    /// The granted catalog action.
    pub action_id: PermissionActionId,
}

impl Grant {
    /// Creates a new grant edge.
    pub fn new(role_id: impl Into<RoleId>, action_id: impl Into<PermissionActionId>) -> Self {
        Self {
            role_id: role_id.into(),
            action_id: action_id.into(),
        }
    }
}

// =============================================================================
// Annotated Role Grant View
// =============================================================================

/// One catalog action annotated with a role's assignment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionAssignment {
    /// The catalog action.
    pub action: PermissionAction,

    /// Whether the role holds a grant for this action.
    pub assigned: bool,
}

impl ActionAssignment {
    /// Creates a new assignment row.
    pub fn new(action: PermissionAction, assigned: bool) -> Self {
        Self { action, assigned }
    }

    /// Returns the action id.
    #[inline]
    pub fn id(&self) -> PermissionActionId {
        self.action.id
    }

    /// Returns the action key.
    #[inline]
    pub fn key(&self) -> ActionKey {
        self.action.key
    }
}

/// One module of a role's grant view: every defined action annotated with
/// its assignment state for the role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleGrants {
    /// Unique module code.
    pub code: ModuleCode,

    /// Display name.
    pub name: String,

    /// Optional section label for UI clustering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,

    /// Every defined action with its assignment flag, in sort order.
    pub actions: Vec<ActionAssignment>,
}

impl ModuleGrants {
    /// Returns the ids of the assigned actions.
    pub fn assigned_ids(&self) -> Vec<PermissionActionId> {
        self.actions
            .iter()
            .filter(|a| a.assigned)
            .map(|a| a.id())
            .collect()
    }

    /// Returns the assigned action keys as a set.
    pub fn assigned_keys(&self) -> ActionSet {
        self.actions
            .iter()
            .filter(|a| a.assigned)
            .map(|a| a.key())
            .collect()
    }

    /// Returns `true` if every defined action is assigned.
    ///
    /// A module with no defined actions reports `false`.
    pub fn is_fully_assigned(&self) -> bool {
        !self.actions.is_empty() && self.actions.iter().all(|a| a.assigned)
    }

    /// Returns `true` if at least one action is assigned.
    pub fn any_assigned(&self) -> bool {
        self.actions.iter().any(|a| a.assigned)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_code() {
        let code = ModuleCode::new("rooms");
        assert_eq!(code.as_str(), "rooms");
        assert_eq!(format!("{}", code), "rooms");
        assert!(!code.is_empty());
    }

    #[test]
    fn test_role_code() {
        let code = RoleCode::new("ADMIN");
        assert_eq!(code.as_str(), "ADMIN");
        assert_eq!(format!("{}", code), "ADMIN");
    }

    #[test]
    fn test_id_validity() {
        assert!(PermissionActionId::new(1).is_valid());
        assert!(!PermissionActionId::new(0).is_valid());
        assert!(!PermissionActionId::new(-3).is_valid());

        assert!(RoleId::new(7).is_valid());
        assert!(!RoleId::new(0).is_valid());
        assert!(!RoleId::new(-1).is_valid());
    }

    #[test]
    fn test_action_key_strings() {
        assert_eq!(ActionKey::View.as_str(), "view");
        assert_eq!(ActionKey::Create.as_str(), "create");
        assert_eq!(ActionKey::Update.as_str(), "update");
        assert_eq!(ActionKey::Delete.as_str(), "delete");
    }

    #[test]
    fn test_action_key_parse() {
        assert_eq!(ActionKey::parse("view"), Some(ActionKey::View));
        assert_eq!(ActionKey::parse("delete"), Some(ActionKey::Delete));
        assert_eq!(ActionKey::parse("export"), None);
        assert_eq!(ActionKey::parse(""), None);
    }

    #[test]
    fn test_action_key_canonical_order() {
        let all = ActionKey::all();
        assert_eq!(
            all,
            [
                ActionKey::View,
                ActionKey::Create,
                ActionKey::Update,
                ActionKey::Delete
            ]
        );

        let mut shuffled = vec![ActionKey::Delete, ActionKey::View, ActionKey::Update];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![ActionKey::View, ActionKey::Update, ActionKey::Delete]
        );
    }

    #[test]
    fn test_action_set_operations() {
        let mut set = ActionSet::new();
        assert!(set.is_empty());

        assert!(set.add(ActionKey::View));
        assert!(!set.add(ActionKey::View));
        set.add(ActionKey::Update);

        assert!(set.contains(ActionKey::View));
        assert!(!set.contains(ActionKey::Create));
        assert!(set.contains_all(&[ActionKey::View, ActionKey::Update]));
        assert!(!set.contains_all(&[ActionKey::View, ActionKey::Delete]));
        assert!(set.contains_any(&[ActionKey::Delete, ActionKey::Update]));

        assert!(set.remove(ActionKey::View));
        assert!(!set.remove(ActionKey::View));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_action_set_all_and_merge() {
        let all = ActionSet::all();
        assert_eq!(all.len(), 4);

        let mut set: ActionSet = vec![ActionKey::View].into();
        let other: ActionSet = vec![ActionKey::View, ActionKey::Delete].into();
        set.merge(&other);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_action_set_sorted_vec() {
        let set: ActionSet = vec![ActionKey::Delete, ActionKey::View, ActionKey::Create].into();
        assert_eq!(
            set.to_sorted_vec(),
            vec![ActionKey::View, ActionKey::Create, ActionKey::Delete]
        );
    }

    #[test]
    fn test_module_entry_lookup() {
        let entry = ModuleEntry::new("rooms", "Rooms")
            .with_action(PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1))
            .with_action(PermissionAction::new(2, ActionKey::Create, "Create").with_sort_order(2));

        assert!(entry.has_action(ActionKey::View));
        assert!(!entry.has_action(ActionKey::Delete));
        assert_eq!(entry.action(ActionKey::Create).map(|a| a.id.get()), Some(2));
        assert_eq!(
            entry.action_ids(),
            vec![PermissionActionId::new(1), PermissionActionId::new(2)]
        );
    }

    #[test]
    fn test_module_entry_sort_actions() {
        let mut entry = ModuleEntry::new("rooms", "Rooms")
            .with_action(PermissionAction::new(2, ActionKey::Create, "Create").with_sort_order(9))
            .with_action(PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1));

        entry.sort_actions();
        assert_eq!(entry.actions[0].key, ActionKey::View);
        assert_eq!(entry.actions[1].key, ActionKey::Create);
    }

    #[test]
    fn test_role_status() {
        assert!(RoleStatus::Active.is_active());
        assert!(!RoleStatus::Inactive.is_active());
        assert_eq!(RoleStatus::parse("active"), Some(RoleStatus::Active));
        assert_eq!(RoleStatus::parse("retired"), None);
    }

    #[test]
    fn test_role_builder_helpers() {
        let role = Role::new(7, "MANAGER", "Branch Manager")
            .with_description("Runs one branch")
            .with_status(RoleStatus::Inactive);

        assert_eq!(role.id.get(), 7);
        assert_eq!(role.code.as_str(), "MANAGER");
        assert!(!role.is_active());
        assert_eq!(role.description.as_deref(), Some("Runs one branch"));
    }

    #[test]
    fn test_module_grants_helpers() {
        let grants = ModuleGrants {
            code: ModuleCode::new("rooms"),
            name: "Rooms".to_string(),
            group_label: None,
            actions: vec![
                ActionAssignment::new(
                    PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1),
                    true,
                ),
                ActionAssignment::new(
                    PermissionAction::new(2, ActionKey::Create, "Create").with_sort_order(2),
                    false,
                ),
                ActionAssignment::new(
                    PermissionAction::new(3, ActionKey::Update, "Update").with_sort_order(3),
                    true,
                ),
            ],
        };

        assert_eq!(
            grants.assigned_ids(),
            vec![PermissionActionId::new(1), PermissionActionId::new(3)]
        );
        assert!(grants.assigned_keys().contains(ActionKey::View));
        assert!(!grants.assigned_keys().contains(ActionKey::Create));
        assert!(grants.any_assigned());
        assert!(!grants.is_fully_assigned());
    }

    #[test]
    fn test_module_grants_fully_assigned_edge_cases() {
        let empty = ModuleGrants {
            code: ModuleCode::new("legacy"),
            name: "Legacy".to_string(),
            group_label: None,
            actions: vec![],
        };
        assert!(!empty.is_fully_assigned());
        assert!(!empty.any_assigned());

        let full = ModuleGrants {
            code: ModuleCode::new("rooms"),
            name: "Rooms".to_string(),
            group_label: None,
            actions: vec![ActionAssignment::new(
                PermissionAction::new(1, ActionKey::View, "View"),
                true,
            )],
        };
        assert!(full.is_fully_assigned());
    }

    #[test]
    fn test_serde_transparent_ids() {
        let json = serde_json::to_string(&PermissionActionId::new(42)).unwrap();
        assert_eq!(json, "42");

        let code: ModuleCode = serde_json::from_str("\"rooms\"").unwrap();
        assert_eq!(code.as_str(), "rooms");
    }

    #[test]
    fn test_action_key_serde() {
        assert_eq!(
            serde_json::to_string(&ActionKey::Create).unwrap(),
            "\"create\""
        );
        let key: ActionKey = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(key, ActionKey::Delete);
    }
}
