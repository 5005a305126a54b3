// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Latch CLI entry point.

use latch_cli::cli::Cli;
use latch_cli::error::report_error_and_exit;
use latch_cli::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.effective_log_level(), cli.log_format);

    if let Err(err) = latch_cli::commands::execute(cli).await {
        report_error_and_exit(&err);
    }
}
