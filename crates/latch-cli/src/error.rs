// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the Latch CLI.
//!
//! This module defines the top-level error type used throughout the
//! binary, with conversions from library errors and process exit code
//! mapping.

use latch_config::ConfigError;
use latch_core::{DirectoryError, MatrixError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Top-level error type for the Latch CLI.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend client initialization failed
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The requested role does not exist
    #[error("Role not found: {role}")]
    RoleNotFound {
        /// Role id or code as given on the command line
        role: String,
    },

    /// A module:action entry could not be resolved
    #[error("Invalid entry '{entry}': {reason}")]
    InvalidEntry {
        /// Entry as given on the command line
        entry: String,
        /// Why the entry was rejected
        reason: String,
    },

    /// A capability check came back denied
    #[error("Denied: role '{role}' may not perform {module}:{action}")]
    Denied {
        /// Role id or code as given on the command line
        role: String,
        /// Module code that was checked
        module: String,
        /// Action key that was checked
        action: String,
    },

    /// Configuration file error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend directory error
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Grant matrix error
    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Wrapped error with additional context
    #[error("{context}")]
    WithContext {
        /// Context message
        context: String,
        /// Underlying error
        #[source]
        source: Box<CliError>,
    },
}

impl CliError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an initialization error.
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Create a role-not-found error.
    pub fn role_not_found(role: impl Into<String>) -> Self {
        Self::RoleNotFound { role: role.into() }
    }

    /// Create an invalid-entry error.
    pub fn invalid_entry(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Wrap this error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 2,
            Self::Initialization(_) => 3,
            Self::Io(_) => 4,
            Self::RoleNotFound { .. } | Self::InvalidEntry { .. } => 5,
            Self::Denied { .. } => 6,
            Self::Directory(_) | Self::Matrix(_) => 7,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Print an error and its cause chain to stderr.
pub fn report_error(err: &CliError) {
    eprintln!("Error: {}", err);

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Print an error and exit with its mapped exit code.
pub fn report_error_and_exit(err: &CliError) -> ! {
    report_error(err);
    std::process::exit(err.exit_code());
}
