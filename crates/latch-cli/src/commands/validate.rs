// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `validate` command implementation.
//!
//! Parses and validates a configuration file without contacting the
//! backend. Validation failures surface as errors; suspicious but legal
//! settings surface as warnings, which `--strict` escalates.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use latch_config::{load_config, LatchSettings};

use crate::cli::{OutputFormat, ValidateArgs};
use crate::commands::{print_json, print_yaml};
use crate::error::{CliError, CliResult};

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    config_path: String,
    warnings: Vec<String>,
}

/// Validate the configuration file.
pub fn execute(config_path: &Path, args: &ValidateArgs) -> CliResult<()> {
    let settings = load_config(config_path)?;
    debug!(path = %config_path.display(), "Configuration parsed and validated");

    let warnings = collect_warnings(&settings);
    let report = ValidationReport {
        valid: true,
        config_path: config_path.display().to_string(),
        warnings: warnings.clone(),
    };

    match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Yaml => print_yaml(&report)?,
    }

    if args.show_config {
        println!();
        println!("{:#?}", settings);
    }

    if args.strict && !warnings.is_empty() {
        return Err(CliError::configuration(format!(
            "{} warning(s) treated as errors in strict mode",
            warnings.len()
        )));
    }

    Ok(())
}

/// Collect warnings for settings that validate but deserve a second look.
fn collect_warnings(settings: &LatchSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    let base_url = &settings.backend.base_url;
    if base_url.starts_with("http://") && !is_local_host(base_url) {
        warnings.push(
            "backend.base_url uses plain HTTP against a non-local host; \
             the API key will travel unencrypted"
                .to_string(),
        );
    }

    let admin = &settings.session.admin_role_code;
    if admin.chars().any(|c| c.is_ascii_lowercase()) {
        warnings.push(format!(
            "session.admin_role_code '{}' contains lowercase characters; \
             role codes are matched exactly",
            admin
        ));
    }

    if settings.backend.timeout_secs < settings.backend.connect_timeout_secs {
        warnings.push(
            "backend.timeout_secs is smaller than backend.connect_timeout_secs; \
             requests may time out before connecting"
                .to_string(),
        );
    }

    warnings
}

fn is_local_host(url: &str) -> bool {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let host = rest.split(['/', ':']).next().unwrap_or("");
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0")
}

fn render_text(report: &ValidationReport) {
    println!("✓ Configuration valid: {}", report.config_path);

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
    }
}
