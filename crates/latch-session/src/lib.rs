// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-session
//!
//! Session identity and the fail-closed permission cache.
//!
//! This crate connects a [`SessionProvider`] (who is signed in) to a
//! [`PermissionDirectory`](latch_directory::PermissionDirectory) (what
//! their role may do) and exposes the result as synchronous capability
//! checks. The cache loads a [`PermissionSnapshot`] per session, discards
//! stale load results through an epoch guard, and collapses to deny-all on
//! any failure.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use latch_directory::MemoryDirectory;
//! use latch_session::{PermissionCache, SessionUser, StaticSessionProvider};
//!
//! # async fn example() {
//! let provider = Arc::new(StaticSessionProvider::anonymous());
//! provider.set_user(SessionUser::new("u-1").with_role(1, "ADMIN"));
//!
//! let cache = PermissionCache::new(
//!     provider,
//!     Arc::new(MemoryDirectory::new()),
//!     "ADMIN",
//! );
//! cache.refresh().await;
//! assert!(cache.can_view("rooms"));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cache;
pub mod provider;
pub mod snapshot;

// ============================================================================
// Public Re-exports
// ============================================================================

// Cache
pub use cache::{CachePhase, CacheStats, CacheStatsInner, PermissionCache, RefreshOutcome};

// Session
pub use provider::{SessionProvider, SessionState, SessionUser, StaticSessionProvider};

// Snapshot
pub use snapshot::PermissionSnapshot;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
