// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `show` command implementation.

use serde::Serialize;
use tracing::debug;

use latch_core::{ActionKey, Role};
use latch_matrix::{MatrixCell, MatrixLayout};

use crate::cli::{OutputFormat, ShowArgs};
use crate::commands::{print_json, print_yaml, resolve_role};
use crate::context::ConsoleContext;
use crate::error::CliResult;

#[derive(Serialize)]
struct GrantReport<'a> {
    role: &'a Role,
    matrix: &'a MatrixLayout,
}

/// Show the sectioned grant matrix for one role.
pub async fn execute(context: &ConsoleContext, args: &ShowArgs) -> CliResult<()> {
    let directory = context.directory();
    let role = resolve_role(&directory, &args.role).await?;
    let grants = directory.role_permissions(Some(role.id)).await?;
    let layout = MatrixLayout::build(&grants);
    debug!(role = %role.code.as_str(), sections = layout.section_count(), "Matrix built");

    match args.format {
        OutputFormat::Text => render_text(&role, &layout),
        OutputFormat::Json => print_json(&GrantReport {
            role: &role,
            matrix: &layout,
        })?,
        OutputFormat::Yaml => print_yaml(&GrantReport {
            role: &role,
            matrix: &layout,
        })?,
    }

    Ok(())
}

fn render_text(role: &Role, layout: &MatrixLayout) {
    println!(
        "Grants for {} ({}), role id {}",
        role.code.as_str(),
        role.name,
        role.id.get()
    );

    if layout.is_empty() {
        println!();
        println!("Catalog is empty");
        return;
    }

    for section in &layout.sections {
        println!();
        println!("{}", section.label);
        println!(
            "  {:<28} {:^7} {:^7} {:^7} {:^7}",
            "MODULE", "VIEW", "CREATE", "UPDATE", "DELETE"
        );
        for row in &section.rows {
            let module = format!("{} ({})", row.code.as_str(), row.name);
            println!(
                "  {:<28} {:^7} {:^7} {:^7} {:^7}",
                module,
                cell_mark(row.cell(ActionKey::View)),
                cell_mark(row.cell(ActionKey::Create)),
                cell_mark(row.cell(ActionKey::Update)),
                cell_mark(row.cell(ActionKey::Delete))
            );
        }
    }

    let defined: usize = layout.rows().map(|r| r.defined_ids().len()).sum();
    let assigned = layout.assigned_ids().len();
    println!();
    println!("{} of {} defined actions assigned", assigned, defined);
}

fn cell_mark(cell: &MatrixCell) -> &'static str {
    if !cell.is_defined() {
        "-"
    } else if cell.assigned {
        "[x]"
    } else {
        "[ ]"
    }
}
