// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `grant`, `revoke`, and `clear` command implementations.
//!
//! All three rewrite the target role's full grant set: the current set is
//! fetched, adjusted locally, and written back wholesale, matching how
//! the console's matrix editor persists.

use std::collections::BTreeSet;

use tracing::info;

use latch_core::{PermissionActionId, RoleId};

use crate::cli::{ClearArgs, GrantArgs, RevokeArgs};
use crate::commands::{resolve_entries, resolve_role};
use crate::context::ConsoleContext;
use crate::error::{CliError, CliResult};

/// Add module:action entries to a role's grant set.
pub async fn grant(context: &ConsoleContext, args: &GrantArgs) -> CliResult<()> {
    let directory = context.directory();
    let role = resolve_role(&directory, &args.role).await?;
    let catalog = directory.list_modules().await?;
    let ids = resolve_entries(&catalog, &args.entries)?;

    let grants = directory.role_permissions(Some(role.id)).await?;
    let mut assigned: BTreeSet<PermissionActionId> =
        grants.iter().flat_map(|g| g.assigned_ids()).collect();

    let before = assigned.len();
    assigned.extend(ids.iter().copied());
    let added = assigned.len() - before;

    write_grants(context, role.code.as_str(), role.id, &assigned).await?;
    info!(role = %role.code.as_str(), added, total = assigned.len(), "Grants added");

    println!(
        "Granted {} new entr{} to {} ({} assigned)",
        added,
        if added == 1 { "y" } else { "ies" },
        role.code.as_str(),
        assigned.len()
    );
    Ok(())
}

/// Remove module:action entries from a role's grant set.
pub async fn revoke(context: &ConsoleContext, args: &RevokeArgs) -> CliResult<()> {
    let directory = context.directory();
    let role = resolve_role(&directory, &args.role).await?;
    let catalog = directory.list_modules().await?;
    let ids = resolve_entries(&catalog, &args.entries)?;

    let grants = directory.role_permissions(Some(role.id)).await?;
    let mut assigned: BTreeSet<PermissionActionId> =
        grants.iter().flat_map(|g| g.assigned_ids()).collect();

    let before = assigned.len();
    for id in &ids {
        assigned.remove(id);
    }
    let removed = before - assigned.len();

    write_grants(context, role.code.as_str(), role.id, &assigned).await?;
    info!(role = %role.code.as_str(), removed, total = assigned.len(), "Grants removed");

    println!(
        "Revoked {} entr{} from {} ({} assigned)",
        removed,
        if removed == 1 { "y" } else { "ies" },
        role.code.as_str(),
        assigned.len()
    );
    Ok(())
}

/// Remove every grant from a role.
pub async fn clear(context: &ConsoleContext, args: &ClearArgs) -> CliResult<()> {
    let directory = context.directory();
    let role = resolve_role(&directory, &args.role).await?;

    write_grants(context, role.code.as_str(), role.id, &BTreeSet::new()).await?;
    info!(role = %role.code.as_str(), "Grants cleared");

    println!("Cleared all grants from {}", role.code.as_str());
    Ok(())
}

async fn write_grants(
    context: &ConsoleContext,
    role_code: &str,
    role_id: RoleId,
    assigned: &BTreeSet<PermissionActionId>,
) -> CliResult<()> {
    let replacement: Vec<PermissionActionId> = assigned.iter().copied().collect();

    context
        .directory()
        .replace_role_permissions(role_id, &replacement)
        .await
        .map_err(|e| {
            CliError::from(e)
                .with_context(format!("Failed to write grants for role '{}'", role_code))
        })
}
