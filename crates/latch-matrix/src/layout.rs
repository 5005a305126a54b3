// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Grant matrix layout.
//!
//! Turns joined grant rows into the sectioned grid the console renders:
//! one row per module, one cell per action in the fixed vocabulary, rows
//! clustered into labeled sections. Cells for actions a module does not
//! define are kept in the grid (the columns stay aligned) but marked
//! undefined, and the renderer leaves them blank.

use std::collections::BTreeSet;

use serde::Serialize;

use latch_core::types::{ActionAssignment, ActionKey, ModuleCode, ModuleGrants, PermissionActionId};

/// Section label for modules without a group label or fallback mapping.
pub const OTHER_SECTION: &str = "Other";

/// Maps well-known module codes to a section when the catalog carries no
/// group label.
pub fn fallback_section(module_code: &str) -> Option<&'static str> {
    match module_code {
        "branches" | "rooms" | "reservations" => Some("Operations"),
        "roles" | "permissions" | "users" => Some("Administration"),
        "billing" | "payments" => Some("Finance"),
        _ => None,
    }
}

// ============================================================================
// Cells and Rows
// ============================================================================

/// One cell of the grant matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    /// Which action column this cell sits in.
    pub key: ActionKey,

    /// The catalog id behind the cell; `None` if the module does not
    /// define this action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<PermissionActionId>,

    /// Display label for the cell, when defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Whether the cell is checked.
    pub assigned: bool,
}

impl MatrixCell {
    /// A cell for an action the module does not define.
    pub fn undefined(key: ActionKey) -> Self {
        Self {
            key,
            action_id: None,
            label: None,
            assigned: false,
        }
    }

    /// A cell backed by a catalog action.
    pub fn defined(assignment: &ActionAssignment, assigned: bool) -> Self {
        Self {
            key: assignment.key(),
            action_id: Some(assignment.id()),
            label: Some(assignment.action.label.clone()),
            assigned,
        }
    }

    /// Returns `true` if the cell is backed by a catalog action.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.action_id.is_some()
    }
}

/// One module row of the grant matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    /// Module code.
    pub code: ModuleCode,

    /// Module display name.
    pub name: String,

    /// One cell per action in canonical column order. Private so the
    /// one-cell-per-key invariant holds for every constructed row.
    cells: Vec<MatrixCell>,
}

impl MatrixRow {
    /// Builds a row, marking cells checked when their id is selected.
    pub fn from_grants(grants: &ModuleGrants, selected: &BTreeSet<PermissionActionId>) -> Self {
        let cells = ActionKey::all()
            .into_iter()
            .map(|key| {
                match grants.actions.iter().find(|a| a.key() == key) {
                    Some(assignment) => {
                        MatrixCell::defined(assignment, selected.contains(&assignment.id()))
                    }
                    None => MatrixCell::undefined(key),
                }
            })
            .collect();

        Self {
            code: grants.code.clone(),
            name: grants.name.clone(),
            cells,
        }
    }

    /// All four cells in canonical column order.
    pub fn cells(&self) -> &[MatrixCell] {
        &self.cells
    }

    /// The cell in the given action column.
    pub fn cell(&self, key: ActionKey) -> &MatrixCell {
        // from_grants builds one cell per key in canonical order.
        &self.cells[key as usize]
    }

    /// Ids of every defined cell.
    pub fn defined_ids(&self) -> Vec<PermissionActionId> {
        self.cells.iter().filter_map(|c| c.action_id).collect()
    }

    /// Ids of every checked cell.
    pub fn assigned_ids(&self) -> Vec<PermissionActionId> {
        self.cells
            .iter()
            .filter(|c| c.assigned)
            .filter_map(|c| c.action_id)
            .collect()
    }

    /// Returns `true` if every defined cell is checked.
    ///
    /// A row with no defined cells reports `false`.
    pub fn fully_assigned(&self) -> bool {
        let defined: Vec<_> = self.cells.iter().filter(|c| c.is_defined()).collect();
        !defined.is_empty() && defined.iter().all(|c| c.assigned)
    }

    /// Returns `true` if any cell is checked.
    pub fn any_assigned(&self) -> bool {
        self.cells.iter().any(|c| c.assigned)
    }
}

// ============================================================================
// Sections and Layout
// ============================================================================

/// A labeled cluster of matrix rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixSection {
    /// Section heading.
    pub label: String,

    /// Rows in catalog order.
    pub rows: Vec<MatrixRow>,
}

/// The full sectioned grant matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatrixLayout {
    /// Sections in display order; the fallback section is always last.
    pub sections: Vec<MatrixSection>,
}

impl MatrixLayout {
    /// Builds the layout with checked state taken from the rows themselves.
    pub fn build(grants: &[ModuleGrants]) -> Self {
        let selected: BTreeSet<PermissionActionId> = grants
            .iter()
            .flat_map(|g| g.assigned_ids())
            .collect();
        Self::build_with_selection(grants, &selected)
    }

    /// Builds the layout with checked state taken from an explicit
    /// selection, as the editor does while edits are pending.
    ///
    /// Sections appear in order of first appearance in the catalog, except
    /// [`OTHER_SECTION`], which always sorts last.
    pub fn build_with_selection(
        grants: &[ModuleGrants],
        selected: &BTreeSet<PermissionActionId>,
    ) -> Self {
        let mut sections: Vec<MatrixSection> = Vec::new();
        let mut other: Option<MatrixSection> = None;

        for module in grants {
            let label = module
                .group_label
                .clone()
                .or_else(|| fallback_section(module.code.as_str()).map(str::to_string));
            let row = MatrixRow::from_grants(module, selected);

            match label {
                Some(label) => {
                    match sections.iter_mut().find(|s| s.label == label) {
                        Some(section) => section.rows.push(row),
                        None => sections.push(MatrixSection {
                            label,
                            rows: vec![row],
                        }),
                    }
                }
                None => {
                    other
                        .get_or_insert_with(|| MatrixSection {
                            label: OTHER_SECTION.to_string(),
                            rows: Vec::new(),
                        })
                        .rows
                        .push(row);
                }
            }
        }

        if let Some(other) = other {
            sections.push(other);
        }

        Self { sections }
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Iterates over every row across all sections.
    pub fn rows(&self) -> impl Iterator<Item = &MatrixRow> {
        self.sections.iter().flat_map(|s| s.rows.iter())
    }

    /// Finds the row for a module code.
    pub fn find_row(&self, module_code: &str) -> Option<&MatrixRow> {
        self.rows().find(|r| r.code.as_str() == module_code)
    }

    /// Ids of every checked cell across the whole matrix.
    pub fn assigned_ids(&self) -> BTreeSet<PermissionActionId> {
        self.rows().flat_map(|r| r.assigned_ids()).collect()
    }

    /// Returns `true` if the layout has no rows.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
