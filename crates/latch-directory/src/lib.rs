// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-directory
//!
//! Permission directory backends for the Latch admin console.
//!
//! This crate defines the [`PermissionDirectory`] trait plus two
//! implementations: [`RestDirectory`] for a hosted PostgREST-style backend
//! and [`MemoryDirectory`] for tests and offline runs. All catalog
//! ordering, grant normalization, and join semantics live here so every
//! backend behaves identically.
//!
//! # Example
//!
//! ```rust
//! use latch_directory::{MemoryDirectory, PermissionDirectory};
//! use latch_core::types::RoleId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = MemoryDirectory::new();
//! let rows = directory.role_permissions(Some(RoleId::new(7))).await?;
//! assert!(rows.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module Declarations
// ============================================================================

pub mod memory;
pub mod rest;
pub mod traits;
pub mod wire;

// ============================================================================
// Public Re-exports
// ============================================================================

// Trait and shared helpers
pub use traits::{
    join_role_grants, normalize_action_ids, DirectoryConfig, DirectoryConfigBuilder,
    DirectoryStats, DirectoryStatsInner, PermissionDirectory,
};

// Backends
pub use memory::MemoryDirectory;
pub use rest::RestDirectory;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
