// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-core
//!
//! Core domain types and error hierarchy for LATCH, the client-side
//! permission toolkit of the Sylvex rental management console.
//!
//! This crate provides the foundational types used across all LATCH
//! components:
//!
//! - **Types**: Identifiers (`ModuleCode`, `RoleId`), the `ActionKey`
//!   vocabulary, catalog entries, roles, and grant edges
//! - **Catalog**: The indexed universe of modules and actions
//! - **Error**: Unified error hierarchy with fail-closed semantics
//!
//! ## Example
//!
//! ```rust
//! use latch_core::catalog::Catalog;
//! use latch_core::types::{ActionKey, ModuleEntry, PermissionAction};
//!
//! let catalog = Catalog::new(vec![ModuleEntry::new("rooms", "Rooms")
//!     .with_action(PermissionAction::new(1, ActionKey::View, "View"))]);
//!
//! assert!(catalog.action_id("rooms", ActionKey::View).is_some());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod catalog;
pub mod error;
pub mod types;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{
    DirectoryError, DirectoryResult, LatchError, LatchResult, MatrixError, MatrixResult,
    ReplacePhase,
};
pub use types::{
    ActionAssignment, ActionKey, ActionSet, Grant, ModuleCode, ModuleEntry, ModuleGrants,
    PermissionAction, PermissionActionId, Role, RoleCode, RoleId, RoleStatus,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
