// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command implementations for the Latch CLI.
//!
//! Each submodule handles one CLI subcommand. This module provides the
//! dispatcher plus the role and entry resolution helpers shared by the
//! commands that target a role.

pub mod catalog;
pub mod check;
pub mod grant;
pub mod roles;
pub mod show;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use latch_core::{ActionKey, ModuleEntry, PermissionActionId, Role};
use latch_directory::PermissionDirectory;

use crate::cli::{Cli, Commands};
use crate::context::{ConsoleContext, ContextBuilder};
use crate::error::{CliError, CliResult};

// =============================================================================
// Dispatcher
// =============================================================================

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Catalog(args) => catalog::execute(&context(&cli.config)?, &args).await,
        Commands::Roles(args) => roles::execute(&context(&cli.config)?, &args).await,
        Commands::Show(args) => show::execute(&context(&cli.config)?, &args).await,
        Commands::Grant(args) => grant::grant(&context(&cli.config)?, &args).await,
        Commands::Revoke(args) => grant::revoke(&context(&cli.config)?, &args).await,
        Commands::Clear(args) => grant::clear(&context(&cli.config)?, &args).await,
        Commands::Check(args) => check::execute(&context(&cli.config)?, &args).await,
        Commands::Validate(args) => validate::execute(&cli.config, &args),
        Commands::Version => version::execute(),
    }
}

fn context(config_path: &Path) -> CliResult<ConsoleContext> {
    ContextBuilder::new().config_path(config_path).build()
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Resolve a role selector against the directory.
///
/// Numeric selectors match on role id, anything else matches the role
/// code case-insensitively. Inactive roles resolve too; hiding them is
/// the `roles` listing's concern, not the targeting commands'.
pub(crate) async fn resolve_role(
    directory: &Arc<dyn PermissionDirectory>,
    selector: &str,
) -> CliResult<Role> {
    let roles = directory.list_roles().await?;

    let found = if let Ok(id) = selector.parse::<i64>() {
        roles.iter().find(|r| r.id.get() == id)
    } else {
        roles
            .iter()
            .find(|r| r.code.as_str().eq_ignore_ascii_case(selector))
    };

    found
        .cloned()
        .ok_or_else(|| CliError::role_not_found(selector))
}

/// Resolve `module:action` pairs against the catalog.
///
/// Every entry must name a module the catalog contains and an action that
/// module defines. The first bad entry aborts resolution, so a grant
/// command either applies completely or not at all.
pub(crate) fn resolve_entries(
    catalog: &[ModuleEntry],
    entries: &[String],
) -> CliResult<Vec<PermissionActionId>> {
    let mut ids = Vec::with_capacity(entries.len());

    for entry in entries {
        let (module_code, action_str) = entry
            .split_once(':')
            .ok_or_else(|| CliError::invalid_entry(entry, "expected module:action"))?;

        let key = ActionKey::parse(&action_str.to_lowercase()).ok_or_else(|| {
            CliError::invalid_entry(
                entry,
                format!(
                    "unknown action '{}' (expected view, create, update, or delete)",
                    action_str
                ),
            )
        })?;

        let module = catalog
            .iter()
            .find(|m| m.code.as_str().eq_ignore_ascii_case(module_code))
            .ok_or_else(|| {
                CliError::invalid_entry(entry, format!("unknown module '{}'", module_code))
            })?;

        let action = module.action(key).ok_or_else(|| {
            CliError::invalid_entry(
                entry,
                format!(
                    "module '{}' does not define '{}'",
                    module.code.as_str(),
                    key.as_str()
                ),
            )
        })?;

        ids.push(action.id);
    }

    Ok(ids)
}

/// Print a value as pretty JSON to stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Io(format!("JSON encoding failed: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Print a value as YAML to stdout.
pub(crate) fn print_yaml<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_yaml::to_string(value)
        .map_err(|e| CliError::Io(format!("YAML encoding failed: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use latch_core::types::{ModuleEntry, PermissionAction, Role, RoleStatus};
    use latch_core::ActionKey;
    use latch_directory::MemoryDirectory;

    /// A directory seeded with a two-module catalog and three roles.
    pub fn seeded_directory() -> Arc<MemoryDirectory> {
        let directory = Arc::new(MemoryDirectory::with_catalog(vec![
            ModuleEntry::new("rooms", "Rooms")
                .with_group_label("Property")
                .with_action(PermissionAction::new(1, ActionKey::View, "View").with_sort_order(1))
                .with_action(
                    PermissionAction::new(2, ActionKey::Create, "Create").with_sort_order(2),
                )
                .with_action(
                    PermissionAction::new(3, ActionKey::Update, "Update").with_sort_order(3),
                )
                .with_action(
                    PermissionAction::new(4, ActionKey::Delete, "Delete").with_sort_order(4),
                ),
            ModuleEntry::new("reservations", "Reservations")
                .with_group_label("Operations")
                .with_action(PermissionAction::new(10, ActionKey::View, "View").with_sort_order(1))
                .with_action(
                    PermissionAction::new(11, ActionKey::Update, "Update").with_sort_order(2),
                ),
        ]));

        directory.set_roles(vec![
            Role::new(1, "ADMIN", "Administrator"),
            Role::new(7, "MANAGER", "Site Manager"),
            Role::new(9, "RETIRED", "Retired Role").with_status(RoleStatus::Inactive),
        ]);

        directory
    }
}
