// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-cli
//!
//! Command-line administration tool for LATCH role permissions.
//!
//! The `latch` binary lets operators inspect the permission catalog,
//! list roles, view and edit per-role grant matrices, and evaluate
//! capability checks against the same backend the admin console uses.
//!
//! ## Commands
//!
//! - `catalog`: list the permission catalog
//! - `roles`: list roles
//! - `show`: show a role's grant matrix
//! - `grant` / `revoke` / `clear`: edit a role's grants
//! - `check`: evaluate a capability the way a console session would
//! - `validate`: validate a configuration file offline
//! - `version`: component version report
//!
//! The library target exists so integration tests can drive the command
//! handlers directly; the binary in `main.rs` is a thin wrapper.

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod logging;

// =============================================================================
// Public Re-exports
// =============================================================================

// CLI surface
pub use cli::{Cli, Commands, LogFormat, OutputFormat};

// Execution context
pub use context::{ConsoleContext, ContextBuilder};

// Errors
pub use error::{report_error, report_error_and_exit, CliError, CliResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
