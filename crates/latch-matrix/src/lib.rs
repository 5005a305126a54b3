// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-matrix
//!
//! Grant matrix layout and optimistic editing.
//!
//! This crate turns a role's grant view into the sectioned grid the admin
//! console renders ([`MatrixLayout`]) and drives edits against a
//! [`PermissionDirectory`](latch_directory::PermissionDirectory) through
//! [`MatrixEditor`]. Cell and row toggles persist immediately and roll back
//! to the backend's state on failure; bulk edits stay local until saved.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use latch_directory::MemoryDirectory;
//! use latch_matrix::MatrixEditor;
//! use latch_session::{PermissionCache, SessionUser, StaticSessionProvider};
//!
//! # async fn example() {
//! let directory = Arc::new(MemoryDirectory::new());
//! let provider = Arc::new(StaticSessionProvider::anonymous());
//! provider.set_user(SessionUser::new("u-1").with_role(1, "ADMIN"));
//! let cache = Arc::new(PermissionCache::new(provider, directory.clone(), "ADMIN"));
//!
//! let editor = MatrixEditor::new(directory, cache);
//! assert!(editor.role().is_none());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module Declarations
// ============================================================================

pub mod editor;
pub mod layout;

// ============================================================================
// Public Re-exports
// ============================================================================

// Editor
pub use editor::{EditOutcome, MatrixEditor, PERMISSIONS_MODULE};

// Layout
pub use layout::{
    fallback_section, MatrixCell, MatrixLayout, MatrixRow, MatrixSection, OTHER_SECTION,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "latch-matrix");
    }
}
