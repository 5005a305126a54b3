// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `check` command implementation.
//!
//! Evaluates a capability exactly the way a console session would: a
//! synthetic session is primed with the target role, the permission
//! cache loads that role's grants, and the verdict comes from the cache.
//! A denied check exits non-zero so scripts can branch on it.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use latch_core::ActionKey;
use latch_session::{
    PermissionCache, RefreshOutcome, SessionState, SessionUser, StaticSessionProvider,
};

use crate::cli::{CheckArgs, OutputFormat};
use crate::commands::{print_json, print_yaml, resolve_role};
use crate::context::ConsoleContext;
use crate::error::{CliError, CliResult};

#[derive(Serialize)]
struct CheckReport<'a> {
    role: &'a str,
    module: &'a str,
    action: &'a str,
    allowed: bool,
    bypass: bool,
}

/// Check whether a role may perform a module action.
pub async fn execute(context: &ConsoleContext, args: &CheckArgs) -> CliResult<()> {
    let directory = context.directory();
    let role = resolve_role(&directory, &args.role).await?;

    let key = ActionKey::parse(&args.action.to_lowercase()).ok_or_else(|| {
        CliError::invalid_entry(
            format!("{}:{}", args.module, args.action),
            format!(
                "unknown action '{}' (expected view, create, update, or delete)",
                args.action
            ),
        )
    })?;

    let provider = Arc::new(StaticSessionProvider::new(SessionState::with_user(
        SessionUser::new("latch-cli").with_role(role.id, role.code.clone()),
    )));
    let cache = PermissionCache::new(provider, directory, context.admin_role_code());

    let bypass = role.code.as_str() == context.admin_role_code();
    let outcome = cache.refresh().await;
    debug!(role = %role.code.as_str(), ?outcome, "Permissions loaded for check");

    if outcome == RefreshOutcome::FailedClosed && !bypass {
        let detail = cache
            .last_error()
            .unwrap_or_else(|| "permission load failed".to_string());
        return Err(CliError::initialization(format!(
            "Could not load permissions for check: {}",
            detail
        )));
    }

    let allowed = cache.can_perform(&args.module, key);

    let report = CheckReport {
        role: role.code.as_str(),
        module: &args.module,
        action: key.as_str(),
        allowed,
        bypass,
    };

    match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Yaml => print_yaml(&report)?,
    }

    if allowed {
        Ok(())
    } else {
        Err(CliError::Denied {
            role: role.code.as_str().to_string(),
            module: args.module.clone(),
            action: key.as_str().to_string(),
        })
    }
}

fn render_text(report: &CheckReport<'_>) {
    if report.allowed {
        let suffix = if report.bypass { " (admin bypass)" } else { "" };
        println!(
            "✓ {} may perform {}:{}{}",
            report.role, report.module, report.action, suffix
        );
    } else {
        println!(
            "✗ {} may not perform {}:{}",
            report.role, report.module, report.action
        );
    }
}
