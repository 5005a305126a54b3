// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! This module provides the command-line interface for Latch using clap.
//! It supports multiple subcommands for different operations:
//!
//! - `catalog`: List the permission catalog
//! - `roles`: List roles
//! - `show`: Show a role's grant matrix
//! - `grant` / `revoke` / `clear`: Edit a role's grants
//! - `check`: Check a capability
//! - `validate`: Validate configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Latch - role permission administration
///
/// Administers the permission catalog and role grant matrix of the Latch
/// admin console against its hosted backend.
#[derive(Parser, Debug)]
#[command(
    name = "latch",
    author,
    version,
    about = "Role permission administration for the Latch admin console",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "latch.yaml",
        env = "LATCH_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "LATCH_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "LATCH_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Latch CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the permission catalog
    ///
    /// Fetches every permission module and its defined actions from the
    /// backend, in catalog order.
    Catalog(CatalogArgs),

    /// List roles
    ///
    /// Fetches the role directory. Inactive roles are hidden unless
    /// `--all` is given.
    Roles(RolesArgs),

    /// Show a role's grant matrix
    ///
    /// Renders the sectioned grant matrix for one role, marking assigned,
    /// unassigned, and undefined cells.
    Show(ShowArgs),

    /// Grant actions to a role
    ///
    /// Adds the given module:action pairs to the role's grants and writes
    /// the full replacement set to the backend.
    Grant(GrantArgs),

    /// Revoke actions from a role
    ///
    /// Removes the given module:action pairs from the role's grants and
    /// writes the full replacement set to the backend.
    Revoke(RevokeArgs),

    /// Remove every grant from a role
    Clear(ClearArgs),

    /// Check whether a role may perform an action
    ///
    /// Loads the role's permissions the way a console session would and
    /// reports the capability decision. Exits non-zero on deny.
    Check(CheckArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without contacting the
    /// backend. Useful for checking configuration before deployment.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `catalog` command.
#[derive(Args, Debug, Default, Clone)]
pub struct CatalogArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `roles` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RolesArgs {
    /// Include inactive roles
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `show` command.
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Role id or role code
    pub role: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `grant` command.
#[derive(Args, Debug, Clone)]
pub struct GrantArgs {
    /// Role id or role code
    pub role: String,

    /// Grants as module:action pairs (e.g. rooms:view reservations:update)
    #[arg(required = true)]
    pub entries: Vec<String>,
}

/// Arguments for the `revoke` command.
#[derive(Args, Debug, Clone)]
pub struct RevokeArgs {
    /// Role id or role code
    pub role: String,

    /// Revocations as module:action pairs (e.g. rooms:delete)
    #[arg(required = true)]
    pub entries: Vec<String>,
}

/// Arguments for the `clear` command.
#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    /// Role id or role code
    pub role: String,
}

/// Arguments for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Role id or role code
    pub role: String,

    /// Module code (e.g. rooms)
    pub module: String,

    /// Action key (view, create, update, delete)
    pub action: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
    /// YAML format
    Yaml,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

impl Default for ValidateArgs {
    fn default() -> Self {
        Self {
            show_config: false,
            format: OutputFormat::Text,
            strict: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
