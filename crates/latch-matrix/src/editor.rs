// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Optimistic grant matrix editor.
//!
//! [`MatrixEditor`] owns the editing state for one role at a time: the
//! loaded grant rows, the working selection, and the last-persisted
//! baseline. Single-cell and row toggles persist the entire selection
//! immediately; bulk edits stay local until an explicit save. Every
//! persisted set is the full replacement for the role, so the selection is
//! always the source of truth for what the backend should hold.
//!
//! # Failure Handling
//!
//! A failed persist triggers a reload from the directory so the editor
//! shows the backend's actual state, then surfaces the original error. If
//! the reload fails too, the selection falls back to the last baseline.
//!
//! # Staleness
//!
//! Role switches bump an epoch; any load or persist that finishes under a
//! stale epoch leaves the editor state untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use latch_core::error::{DirectoryError, MatrixError, MatrixResult};
use latch_core::types::{ActionKey, ModuleGrants, PermissionActionId, Role, RoleId};
use latch_directory::PermissionDirectory;
use latch_session::PermissionCache;

use crate::layout::MatrixLayout;

/// Module code guarding matrix editing itself.
pub const PERMISSIONS_MODULE: &str = "permissions";

// ============================================================================
// Edit Outcome
// ============================================================================

/// What an editor operation actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The selection was persisted to the directory.
    Persisted,
    /// The selection changed locally; nothing was persisted yet.
    Applied,
    /// A save or load was in flight; the request was dropped.
    Busy,
    /// The session lacks the permission to edit grants.
    ReadOnly,
}

// ============================================================================
// Editor State
// ============================================================================

#[derive(Debug, Default)]
struct EditorState {
    role: Option<Role>,
    grants: Vec<ModuleGrants>,
    selected: BTreeSet<PermissionActionId>,
    baseline: BTreeSet<PermissionActionId>,
    saving: bool,
    loading: bool,
    epoch: u64,
}

fn find_action_id(
    grants: &[ModuleGrants],
    module: &str,
    action: ActionKey,
) -> Option<PermissionActionId> {
    grants
        .iter()
        .find(|g| g.code.as_str() == module)
        .and_then(|g| g.actions.iter().find(|a| a.key() == action))
        .map(|a| a.id())
}

fn apply_selection(grants: &mut [ModuleGrants], selected: &BTreeSet<PermissionActionId>) {
    for module in grants {
        for assignment in &mut module.actions {
            assignment.assigned = selected.contains(&assignment.id());
        }
    }
}

fn assigned_set(grants: &[ModuleGrants]) -> BTreeSet<PermissionActionId> {
    grants.iter().flat_map(|g| g.assigned_ids()).collect()
}

// ============================================================================
// Matrix Editor
// ============================================================================

/// Editing state machine for one role's grant matrix.
#[derive(Debug)]
pub struct MatrixEditor {
    /// Backend the matrix is loaded from and persisted to.
    directory: Arc<dyn PermissionDirectory>,

    /// Capability checks for the editing session.
    cache: Arc<PermissionCache>,

    /// Guarded editing state.
    state: RwLock<EditorState>,
}

impl MatrixEditor {
    /// Creates an editor with no role selected.
    pub fn new(directory: Arc<dyn PermissionDirectory>, cache: Arc<PermissionCache>) -> Self {
        Self {
            directory,
            cache,
            state: RwLock::new(EditorState::default()),
        }
    }

    /// Returns `true` if the session may edit grants.
    pub fn can_edit(&self) -> bool {
        self.cache.can_perform(PERMISSIONS_MODULE, ActionKey::Update)
    }

    /// Switches the editor to a role and loads its matrix.
    ///
    /// `None` clears the editor. A switch that is overtaken by a newer one
    /// leaves the newer state untouched and returns `Ok`. A load failure
    /// keeps the previous matrix on screen and surfaces the error.
    pub async fn select_role(&self, role: Option<Role>) -> MatrixResult<()> {
        let role = match role {
            Some(role) => role,
            None => {
                let mut state = self.state.write();
                state.epoch += 1;
                state.role = None;
                state.grants.clear();
                state.selected.clear();
                state.baseline.clear();
                state.saving = false;
                state.loading = false;
                debug!("Matrix editor cleared");
                return Ok(());
            }
        };

        let token = {
            let mut state = self.state.write();
            state.epoch += 1;
            state.loading = true;
            state.epoch
        };
        debug!(role_id = role.id.get(), role = %role.code, "Loading grant matrix");

        let result = self.directory.role_permissions(Some(role.id)).await;

        let mut state = self.state.write();
        if state.epoch != token {
            debug!(role = %role.code, "Discarding superseded matrix load");
            return Ok(());
        }

        match result {
            Ok(grants) => {
                let selected = assigned_set(&grants);
                info!(
                    role = %role.code,
                    modules = grants.len(),
                    granted = selected.len(),
                    "Grant matrix loaded"
                );
                state.baseline = selected.clone();
                state.selected = selected;
                state.grants = grants;
                state.role = Some(role);
                state.saving = false;
                state.loading = false;
                Ok(())
            }
            Err(e) => {
                warn!(role = %role.code, error = %e, "Grant matrix load failed");
                state.loading = false;
                // The epoch bump already invalidated any in-flight persist;
                // release its gate or the editor stays busy forever.
                state.saving = false;
                Err(e.into())
            }
        }
    }

    /// Toggles one cell and persists the resulting selection.
    pub async fn toggle_cell(&self, module: &str, action: ActionKey) -> MatrixResult<EditOutcome> {
        let (role_id, token, next) = {
            let mut state = self.state.write();
            let role = match &state.role {
                Some(role) => role,
                None => return Err(MatrixError::NoRoleSelected),
            };
            if state.saving || state.loading {
                debug!(module, action = %action, "Toggle dropped, editor busy");
                return Ok(EditOutcome::Busy);
            }
            if !self.can_edit() {
                return Ok(EditOutcome::ReadOnly);
            }

            let id = match find_action_id(&state.grants, module, action) {
                Some(id) => id,
                None => {
                    if state.grants.iter().any(|g| g.code.as_str() == module) {
                        return Err(MatrixError::unknown_cell(module, action.as_str()));
                    }
                    return Err(MatrixError::unknown_module(module));
                }
            };

            let role_id = role.id;
            let mut next = state.selected.clone();
            if !next.remove(&id) {
                next.insert(id);
            }

            // Optimistic: show the new selection while the write runs.
            state.selected = next.clone();
            state.saving = true;
            (role_id, state.epoch, next)
        };

        self.persist(role_id, token, next).await
    }

    /// Toggles a whole row: clears it if every defined cell is checked,
    /// otherwise checks every defined cell. Persists the result.
    pub async fn toggle_row(&self, module: &str) -> MatrixResult<EditOutcome> {
        let (role_id, token, next) = {
            let mut state = self.state.write();
            let role = match &state.role {
                Some(role) => role,
                None => return Err(MatrixError::NoRoleSelected),
            };
            if state.saving || state.loading {
                debug!(module, "Row toggle dropped, editor busy");
                return Ok(EditOutcome::Busy);
            }
            if !self.can_edit() {
                return Ok(EditOutcome::ReadOnly);
            }

            let defined: Vec<PermissionActionId> = match state
                .grants
                .iter()
                .find(|g| g.code.as_str() == module)
            {
                Some(grants) => grants.actions.iter().map(|a| a.id()).collect(),
                None => return Err(MatrixError::unknown_module(module)),
            };

            let role_id = role.id;
            let mut next = state.selected.clone();
            if defined.iter().all(|id| next.contains(id)) && !defined.is_empty() {
                for id in &defined {
                    next.remove(id);
                }
            } else {
                next.extend(defined.iter().copied());
            }

            state.selected = next.clone();
            state.saving = true;
            (role_id, state.epoch, next)
        };

        self.persist(role_id, token, next).await
    }

    /// Checks every defined cell locally. Persist with [`save`](Self::save).
    pub fn select_all(&self) -> MatrixResult<EditOutcome> {
        self.apply_local(|grants, _| {
            grants
                .iter()
                .flat_map(|g| g.actions.iter().map(|a| a.id()))
                .collect()
        })
    }

    /// Clears every cell locally. Persist with [`save`](Self::save).
    pub fn deselect_all(&self) -> MatrixResult<EditOutcome> {
        self.apply_local(|_, _| BTreeSet::new())
    }

    /// Reverts local edits back to the last persisted baseline.
    pub fn discard_changes(&self) {
        let mut state = self.state.write();
        if state.saving {
            debug!("Discard ignored while a save is in flight");
            return;
        }
        state.selected = state.baseline.clone();
    }

    /// Persists the current selection, then reloads it for confirmation.
    pub async fn save(&self) -> MatrixResult<EditOutcome> {
        let (role_id, token, ids) = {
            let mut state = self.state.write();
            let role = match &state.role {
                Some(role) => role,
                None => return Err(MatrixError::NoRoleSelected),
            };
            if state.saving || state.loading {
                debug!("Save dropped, editor busy");
                return Ok(EditOutcome::Busy);
            }
            if !self.can_edit() {
                return Ok(EditOutcome::ReadOnly);
            }

            let role_id = role.id;
            state.saving = true;
            (role_id, state.epoch, state.selected.clone())
        };

        let ids_vec: Vec<PermissionActionId> = ids.iter().copied().collect();
        match self.directory.replace_role_permissions(role_id, &ids_vec).await {
            Ok(()) => {
                // Confirm against the backend's joined view.
                let reload = self.directory.role_permissions(Some(role_id)).await;
                let mut state = self.state.write();
                if state.epoch != token {
                    debug!("Discarding superseded save confirmation");
                    return Ok(EditOutcome::Persisted);
                }
                match reload {
                    Ok(grants) => {
                        let selected = assigned_set(&grants);
                        state.baseline = selected.clone();
                        state.selected = selected;
                        state.grants = grants;
                    }
                    Err(e) => {
                        warn!(error = %e, "Save confirmed locally, reload failed");
                        state.baseline = ids;
                        let selected = state.selected.clone();
                        apply_selection(&mut state.grants, &selected);
                    }
                }
                state.saving = false;
                info!(role_id = role_id.get(), "Grant matrix saved");
                Ok(EditOutcome::Persisted)
            }
            Err(e) => self.rollback_after_failure(role_id, token, e).await,
        }
    }

    async fn persist(
        &self,
        role_id: RoleId,
        token: u64,
        next: BTreeSet<PermissionActionId>,
    ) -> MatrixResult<EditOutcome> {
        let ids: Vec<PermissionActionId> = next.iter().copied().collect();
        match self.directory.replace_role_permissions(role_id, &ids).await {
            Ok(()) => {
                let mut state = self.state.write();
                if state.epoch != token {
                    debug!("Persist landed after a role switch, local state untouched");
                    return Ok(EditOutcome::Persisted);
                }
                state.baseline = next.clone();
                apply_selection(&mut state.grants, &next);
                state.saving = false;
                debug!(role_id = role_id.get(), grants = next.len(), "Selection persisted");
                Ok(EditOutcome::Persisted)
            }
            Err(e) => self.rollback_after_failure(role_id, token, e).await,
        }
    }

    async fn rollback_after_failure(
        &self,
        role_id: RoleId,
        token: u64,
        error: DirectoryError,
    ) -> MatrixResult<EditOutcome> {
        warn!(role_id = role_id.get(), error = %error, "Persist failed, reloading backend state");

        let reload = self.directory.role_permissions(Some(role_id)).await;

        let mut state = self.state.write();
        if state.epoch != token {
            debug!("Skipping rollback after a role switch");
            return Err(error.into());
        }

        match reload {
            Ok(grants) => {
                let selected = assigned_set(&grants);
                state.baseline = selected.clone();
                state.selected = selected;
                state.grants = grants;
            }
            Err(reload_error) => {
                warn!(error = %reload_error, "Rollback reload failed, reverting to baseline");
                state.selected = state.baseline.clone();
                let baseline = state.baseline.clone();
                apply_selection(&mut state.grants, &baseline);
            }
        }
        state.saving = false;
        Err(error.into())
    }

    fn apply_local(
        &self,
        make_selection: impl FnOnce(
            &[ModuleGrants],
            &BTreeSet<PermissionActionId>,
        ) -> BTreeSet<PermissionActionId>,
    ) -> MatrixResult<EditOutcome> {
        let mut state = self.state.write();
        if state.role.is_none() {
            return Err(MatrixError::NoRoleSelected);
        }
        if state.saving || state.loading {
            return Ok(EditOutcome::Busy);
        }
        if !self.can_edit() {
            return Ok(EditOutcome::ReadOnly);
        }

        state.selected = make_selection(&state.grants, &state.selected);
        Ok(EditOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The selected role, if any.
    pub fn role(&self) -> Option<Role> {
        self.state.read().role.clone()
    }

    /// The sectioned matrix reflecting the working selection.
    pub fn layout(&self) -> MatrixLayout {
        let state = self.state.read();
        MatrixLayout::build_with_selection(&state.grants, &state.selected)
    }

    /// The working selection.
    pub fn selected_ids(&self) -> BTreeSet<PermissionActionId> {
        self.state.read().selected.clone()
    }

    /// The last persisted selection.
    pub fn baseline_ids(&self) -> BTreeSet<PermissionActionId> {
        self.state.read().baseline.clone()
    }

    /// Returns `true` if local edits have not been persisted.
    pub fn is_dirty(&self) -> bool {
        let state = self.state.read();
        state.selected != state.baseline
    }

    /// Returns `true` while a persist is in flight.
    pub fn is_saving(&self) -> bool {
        self.state.read().saving
    }

    /// Returns `true` while a matrix load is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use latch_core::error::{DirectoryError, DirectoryResult};
    use latch_core::types::{ModuleEntry, PermissionAction, RoleId};
    use latch_directory::{DirectoryStats, MemoryDirectory, PermissionDirectory};
    use latch_session::{SessionUser, StaticSessionProvider};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn seeded_directory() -> MemoryDirectory {
        MemoryDirectory::with_catalog(vec![
            ModuleEntry::new("rooms", "Rooms")
                .with_action(PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1))
                .with_action(
                    PermissionAction::new(2, ActionKey::Create, "Create").with_sort_order(2),
                )
                .with_action(
                    PermissionAction::new(3, ActionKey::Update, "Update").with_sort_order(3),
                ),
            ModuleEntry::new("branches", "Branches")
                .with_action(PermissionAction::new(10, ActionKey::View, "View").with_sort_order(1)),
        ])
    }

    fn admin_cache(directory: Arc<dyn PermissionDirectory>) -> Arc<PermissionCache> {
        let provider = StaticSessionProvider::anonymous();
        provider.set_user(SessionUser::new("u-1").with_role(1, "ADMIN"));
        Arc::new(PermissionCache::new(Arc::new(provider), directory, "ADMIN"))
    }

    fn viewer_cache(directory: Arc<dyn PermissionDirectory>) -> Arc<PermissionCache> {
        let provider = StaticSessionProvider::anonymous();
        provider.set_user(SessionUser::new("u-9").with_role(9, "VIEWER"));
        Arc::new(PermissionCache::new(Arc::new(provider), directory, "ADMIN"))
    }

    fn manager_role() -> Role {
        Role::new(7, "MANAGER", "Manager")
    }

    fn ids(raw: &[i64]) -> BTreeSet<PermissionActionId> {
        raw.iter().copied().map(PermissionActionId::new).collect()
    }

    async fn editor_with_role(directory: Arc<MemoryDirectory>) -> MatrixEditor {
        let cache = admin_cache(directory.clone());
        let editor = MatrixEditor::new(directory, cache);
        editor.select_role(Some(manager_role())).await.unwrap();
        editor
    }

    #[tokio::test]
    async fn test_operations_require_a_role() {
        let directory = Arc::new(seeded_directory());
        let editor = MatrixEditor::new(directory.clone(), admin_cache(directory));

        let err = editor.toggle_cell("rooms", ActionKey::View).await.unwrap_err();
        assert!(matches!(err, MatrixError::NoRoleSelected));
        assert!(matches!(
            editor.toggle_row("rooms").await.unwrap_err(),
            MatrixError::NoRoleSelected
        ));
        assert!(matches!(
            editor.select_all().unwrap_err(),
            MatrixError::NoRoleSelected
        ));
        assert!(matches!(
            editor.save().await.unwrap_err(),
            MatrixError::NoRoleSelected
        ));
    }

    #[tokio::test]
    async fn test_select_role_loads_matrix() {
        let directory = Arc::new(seeded_directory());
        directory.seed_grants(RoleId::new(7), &[PermissionActionId::new(1)]);
        let editor = editor_with_role(directory).await;

        assert_eq!(editor.role().unwrap().code.as_str(), "MANAGER");
        assert_eq!(editor.selected_ids(), ids(&[1]));
        assert!(!editor.is_dirty());

        let layout = editor.layout();
        let rooms = layout.find_row("rooms").unwrap();
        assert!(rooms.cell(ActionKey::View).assigned);
        assert!(!rooms.cell(ActionKey::Create).assigned);
    }

    #[tokio::test]
    async fn test_select_none_clears() {
        let directory = Arc::new(seeded_directory());
        let editor = editor_with_role(directory).await;

        editor.select_role(None).await.unwrap();
        assert!(editor.role().is_none());
        assert!(editor.layout().is_empty());
        assert!(editor.selected_ids().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_cell_persists_whole_selection() {
        let directory = Arc::new(seeded_directory());
        directory.seed_grants(RoleId::new(7), &[PermissionActionId::new(1)]);
        let editor = editor_with_role(directory.clone()).await;

        let outcome = editor.toggle_cell("rooms", ActionKey::Create).await.unwrap();
        assert_eq!(outcome, EditOutcome::Persisted);
        assert_eq!(editor.selected_ids(), ids(&[1, 2]));
        assert!(!editor.is_dirty());
        assert!(!editor.is_saving());
        assert_eq!(directory.grant_count(RoleId::new(7)), 2);

        // Toggling the same cell off persists the removal.
        editor.toggle_cell("rooms", ActionKey::Create).await.unwrap();
        assert_eq!(editor.selected_ids(), ids(&[1]));
        assert_eq!(directory.grant_count(RoleId::new(7)), 1);
    }

    #[tokio::test]
    async fn test_toggle_unknown_cell_and_module() {
        let directory = Arc::new(seeded_directory());
        let editor = editor_with_role(directory).await;

        let err = editor.toggle_cell("rooms", ActionKey::Delete).await.unwrap_err();
        assert!(matches!(err, MatrixError::UnknownCell { .. }));

        let err = editor.toggle_cell("reports", ActionKey::View).await.unwrap_err();
        assert!(matches!(err, MatrixError::UnknownModule { .. }));

        let err = editor.toggle_row("reports").await.unwrap_err();
        assert!(matches!(err, MatrixError::UnknownModule { .. }));
    }

    #[tokio::test]
    async fn test_toggle_row_cycles() {
        let directory = Arc::new(seeded_directory());
        directory.seed_grants(RoleId::new(7), &[PermissionActionId::new(1)]);
        let editor = editor_with_role(directory.clone()).await;

        // Partially assigned row fills up.
        editor.toggle_row("rooms").await.unwrap();
        assert_eq!(editor.selected_ids(), ids(&[1, 2, 3]));
        assert_eq!(directory.grant_count(RoleId::new(7)), 3);

        // Fully assigned row clears.
        editor.toggle_row("rooms").await.unwrap();
        assert_eq!(editor.selected_ids(), ids(&[]));
        assert_eq!(directory.grant_count(RoleId::new(7)), 0);
    }

    #[tokio::test]
    async fn test_bulk_edits_stay_local_until_save() {
        let directory = Arc::new(seeded_directory());
        let editor = editor_with_role(directory.clone()).await;

        let outcome = editor.select_all().unwrap();
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(editor.selected_ids(), ids(&[1, 2, 3, 10]));
        assert!(editor.is_dirty());
        assert_eq!(directory.grant_count(RoleId::new(7)), 0);

        let outcome = editor.save().await.unwrap();
        assert_eq!(outcome, EditOutcome::Persisted);
        assert!(!editor.is_dirty());
        assert_eq!(directory.grant_count(RoleId::new(7)), 4);

        editor.deselect_all().unwrap();
        assert!(editor.is_dirty());
        editor.save().await.unwrap();
        assert_eq!(directory.grant_count(RoleId::new(7)), 0);
    }

    #[tokio::test]
    async fn test_discard_reverts_local_edits() {
        let directory = Arc::new(seeded_directory());
        directory.seed_grants(RoleId::new(7), &[PermissionActionId::new(1)]);
        let editor = editor_with_role(directory).await;

        editor.select_all().unwrap();
        assert!(editor.is_dirty());
        editor.discard_changes();
        assert!(!editor.is_dirty());
        assert_eq!(editor.selected_ids(), ids(&[1]));
    }

    #[tokio::test]
    async fn test_read_only_without_update_permission() {
        let directory = Arc::new(seeded_directory());
        let cache = viewer_cache(directory.clone());
        cache.refresh().await;

        let editor = MatrixEditor::new(directory.clone(), cache);
        editor.select_role(Some(manager_role())).await.unwrap();

        assert!(!editor.can_edit());
        let outcome = editor.toggle_cell("rooms", ActionKey::View).await.unwrap();
        assert_eq!(outcome, EditOutcome::ReadOnly);
        assert_eq!(directory.grant_count(RoleId::new(7)), 0);
        assert_eq!(editor.select_all().unwrap(), EditOutcome::ReadOnly);
        assert_eq!(editor.save().await.unwrap(), EditOutcome::ReadOnly);
    }

    // Directory that can be told to fail writes while reads keep working.
    #[derive(Debug)]
    struct FlakyWriteDirectory {
        inner: MemoryDirectory,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl PermissionDirectory for FlakyWriteDirectory {
        async fn list_modules(&self) -> DirectoryResult<Vec<ModuleEntry>> {
            self.inner.list_modules().await
        }

        async fn list_roles(&self) -> DirectoryResult<Vec<Role>> {
            self.inner.list_roles().await
        }

        async fn role_permissions(
            &self,
            role_id: Option<RoleId>,
        ) -> DirectoryResult<Vec<ModuleGrants>> {
            self.inner.role_permissions(role_id).await
        }

        async fn replace_role_permissions(
            &self,
            role_id: RoleId,
            action_ids: &[PermissionActionId],
        ) -> DirectoryResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(DirectoryError::unavailable("write rejected"));
            }
            self.inner.replace_role_permissions(role_id, action_ids).await
        }

        fn stats(&self) -> DirectoryStats {
            self.inner.stats()
        }
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back_to_backend_state() {
        let inner = seeded_directory();
        inner.seed_grants(RoleId::new(7), &[PermissionActionId::new(1)]);
        let directory = Arc::new(FlakyWriteDirectory {
            inner,
            fail_writes: AtomicBool::new(false),
        });

        let cache = admin_cache(directory.clone());
        let editor = MatrixEditor::new(directory.clone(), cache);
        editor.select_role(Some(manager_role())).await.unwrap();

        directory.fail_writes.store(true, Ordering::SeqCst);
        let err = editor.toggle_cell("rooms", ActionKey::Create).await.unwrap_err();
        assert!(matches!(err, MatrixError::Directory(_)));

        // Selection reflects the backend, not the failed optimistic edit.
        assert_eq!(editor.selected_ids(), ids(&[1]));
        assert!(!editor.is_dirty());
        assert!(!editor.is_saving());
    }

    #[tokio::test]
    async fn test_save_failure_surfaces_error_and_reloads() {
        let inner = seeded_directory();
        inner.seed_grants(RoleId::new(7), &[PermissionActionId::new(1)]);
        let directory = Arc::new(FlakyWriteDirectory {
            inner,
            fail_writes: AtomicBool::new(false),
        });

        let cache = admin_cache(directory.clone());
        let editor = MatrixEditor::new(directory.clone(), cache);
        editor.select_role(Some(manager_role())).await.unwrap();

        editor.select_all().unwrap();
        directory.fail_writes.store(true, Ordering::SeqCst);

        let err = editor.save().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(editor.selected_ids(), ids(&[1]));
        assert!(!editor.is_saving());
    }

    // Directory with slow writes, for exercising the busy guard.
    #[derive(Debug)]
    struct SlowWriteDirectory {
        inner: MemoryDirectory,
        delay: Duration,
    }

    #[async_trait]
    impl PermissionDirectory for SlowWriteDirectory {
        async fn list_modules(&self) -> DirectoryResult<Vec<ModuleEntry>> {
            self.inner.list_modules().await
        }

        async fn list_roles(&self) -> DirectoryResult<Vec<Role>> {
            self.inner.list_roles().await
        }

        async fn role_permissions(
            &self,
            role_id: Option<RoleId>,
        ) -> DirectoryResult<Vec<ModuleGrants>> {
            self.inner.role_permissions(role_id).await
        }

        async fn replace_role_permissions(
            &self,
            role_id: RoleId,
            action_ids: &[PermissionActionId],
        ) -> DirectoryResult<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.replace_role_permissions(role_id, action_ids).await
        }

        fn stats(&self) -> DirectoryStats {
            self.inner.stats()
        }
    }

    #[tokio::test]
    async fn test_toggle_dropped_while_saving() {
        let directory = Arc::new(SlowWriteDirectory {
            inner: seeded_directory(),
            delay: Duration::from_millis(100),
        });
        let cache = admin_cache(directory.clone());
        let editor = Arc::new(MatrixEditor::new(directory.clone(), cache));
        editor.select_role(Some(manager_role())).await.unwrap();

        let first = {
            let editor = Arc::clone(&editor);
            tokio::spawn(async move { editor.toggle_cell("rooms", ActionKey::View).await })
        };
        while !editor.is_saving() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let dropped = editor.toggle_cell("rooms", ActionKey::Create).await.unwrap();
        assert_eq!(dropped, EditOutcome::Busy);

        let first = first.await.unwrap().unwrap();
        assert_eq!(first, EditOutcome::Persisted);
        assert_eq!(editor.selected_ids(), ids(&[1]));
    }
}
