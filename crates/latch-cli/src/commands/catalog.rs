// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `catalog` command implementation.

use tracing::debug;

use latch_core::ModuleEntry;

use crate::cli::{CatalogArgs, OutputFormat};
use crate::commands::{print_json, print_yaml};
use crate::context::ConsoleContext;
use crate::error::CliResult;

/// List the permission catalog.
pub async fn execute(context: &ConsoleContext, args: &CatalogArgs) -> CliResult<()> {
    let catalog = context.directory().list_modules().await?;
    debug!(modules = catalog.len(), "Catalog fetched");

    match args.format {
        OutputFormat::Text => render_text(&catalog),
        OutputFormat::Json => print_json(&catalog)?,
        OutputFormat::Yaml => print_yaml(&catalog)?,
    }

    Ok(())
}

fn render_text(catalog: &[ModuleEntry]) {
    if catalog.is_empty() {
        println!("Catalog is empty");
        return;
    }

    println!("Permission catalog ({} modules)", catalog.len());
    for module in catalog {
        println!();
        match &module.group_label {
            Some(group) => println!("{} - {} [{}]", module.code.as_str(), module.name, group),
            None => println!("{} - {}", module.code.as_str(), module.name),
        }
        for action in &module.actions {
            println!(
                "  {:<8} {:<12} (id {})",
                action.key.as_str(),
                action.label,
                action.id.get()
            );
        }
    }
}
