// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `version` command implementation.

use crate::error::CliResult;

/// Print detailed version information for every component.
pub fn execute() -> CliResult<()> {
    println!("latch {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Components:");
    println!("  latch-core       {}", latch_core::VERSION);
    println!("  latch-directory  {}", latch_directory::VERSION);
    println!("  latch-session    {}", latch_session::VERSION);
    println!("  latch-matrix     {}", latch_matrix::VERSION);
    println!("  latch-config     {}", latch_config::VERSION);
    println!();
    println!("License: PolyForm-Noncommercial-1.0.0");
    println!("Repository: https://github.com/sylvex-io/latch");

    Ok(())
}
