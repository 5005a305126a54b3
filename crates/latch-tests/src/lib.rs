// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Latch Integration Tests
//!
//! This crate provides integration tests for the Latch permission toolkit.
//! It includes test utilities, fixtures, and helpers designed for
//! extensibility and maintainability.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities, fixtures, and helpers
//!   - `fixtures`: Pre-built test data for consistent testing
//!   - `builders`: Builder patterns for constructing test objects
//!   - `assertions`: Custom assertion helpers
//!   - `mocks`: Mock implementations for testing
//!   - `harness`: Test harness for integration tests
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p latch-tests
//!
//! # Run specific test suite
//! cargo test -p latch-tests --test integration_directory
//! cargo test -p latch-tests --test integration_session
//! cargo test -p latch-tests --test integration_matrix
//! cargo test -p latch-tests --test integration_config
//!
//! # Run with verbose output
//! cargo test -p latch-tests -- --nocapture
//!
//! # Run specific test
//! cargo test -p latch-tests test_directory_replace_then_read_roundtrip
//! ```
//!
//! ## Test Categories
//!
//! ### Directory Tests (`integration_directory.rs`)
//! - Catalog and role reads with ordering guarantees
//! - Grant set replacement (roundtrip, idempotence, revoke-all)
//! - Catalog joins and unknown-id dropping
//! - Failure injection and statistics
//!
//! ### Session Tests (`integration_session.rs`)
//! - Snapshot loading per session (scoped, admin bypass, roleless)
//! - Fail-closed behavior on directory failures
//! - Stale-load discarding and cache clearing
//!
//! ### Matrix Tests (`integration_matrix.rs`)
//! - Sectioned layout construction
//! - Cell, row, and bulk toggles with persistence
//! - Optimistic rollback and busy gating
//! - Read-only enforcement
//!
//! ### Config Tests (`integration_config.rs`)
//! - Configuration parsing (YAML, TOML, JSON)
//! - Validation rules
//! - Environment variable placeholders and overrides
//!
//! ## Writing New Tests
//!
//! ### Using Fixtures
//!
//! ```rust,ignore
//! use latch_tests::common::fixtures::{CatalogFixtures, RoleFixtures};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let catalog = CatalogFixtures::standard();
//!     let role = RoleFixtures::manager();
//!     // ... test logic
//! }
//! ```
//!
//! ### Using Builders
//!
//! ```rust,ignore
//! use latch_tests::common::builders::ModuleBuilder;
//! use latch_core::types::ActionKey;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let module = ModuleBuilder::new("rooms", "Rooms")
//!         .action(1, ActionKey::View)
//!         .action(2, ActionKey::Create)
//!         .build();
//!     // ... test logic
//! }
//! ```
//!
//! ### Using Test Harness
//!
//! ```rust,ignore
//! use latch_tests::common::harness::TestHarness;
//!
//! #[tokio::test]
//! async fn test_with_harness() {
//!     let harness = TestHarness::with_name("my_test");
//!     harness.run(|resources| async move {
//!         // Use resources.directory, resources.provider, etc.
//!     }).await;
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
}
