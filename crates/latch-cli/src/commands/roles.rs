// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `roles` command implementation.

use tracing::debug;

use latch_core::Role;

use crate::cli::{OutputFormat, RolesArgs};
use crate::commands::{print_json, print_yaml};
use crate::context::ConsoleContext;
use crate::error::CliResult;

/// List roles, hiding inactive ones unless `--all` is given.
pub async fn execute(context: &ConsoleContext, args: &RolesArgs) -> CliResult<()> {
    let mut roles = context.directory().list_roles().await?;
    debug!(roles = roles.len(), all = args.all, "Roles fetched");

    if !args.all {
        roles.retain(Role::is_active);
    }

    match args.format {
        OutputFormat::Text => render_text(&roles),
        OutputFormat::Json => print_json(&roles)?,
        OutputFormat::Yaml => print_yaml(&roles)?,
    }

    Ok(())
}

fn render_text(roles: &[Role]) {
    if roles.is_empty() {
        println!("No roles found");
        return;
    }

    println!("{:<6} {:<16} {:<24} {}", "ID", "CODE", "NAME", "STATUS");
    for role in roles {
        println!(
            "{:<6} {:<16} {:<24} {}",
            role.id.get(),
            role.code.as_str(),
            role.name,
            role.status.as_str()
        );
    }
}
