// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command execution context.
//!
//! Bundles the loaded settings with the backend directory client so the
//! command handlers receive one ready-to-use handle instead of wiring
//! the pieces themselves.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use latch_config::{load_config, BackendSettings, LatchSettings};
use latch_directory::{DirectoryConfig, PermissionDirectory, RestDirectory};

use crate::error::{CliError, CliResult};

// =============================================================================
// Context
// =============================================================================

/// Shared context for command execution.
pub struct ConsoleContext {
    settings: Arc<LatchSettings>,
    directory: Arc<dyn PermissionDirectory>,
}

impl ConsoleContext {
    /// Create a context backed by the configured REST directory.
    pub fn new(settings: LatchSettings) -> Self {
        let config = directory_config(&settings.backend);
        debug!(base_url = %config.base_url, schema = %config.schema, "Backend client configured");
        let directory: Arc<dyn PermissionDirectory> = Arc::new(RestDirectory::new(config));

        Self {
            settings: Arc::new(settings),
            directory,
        }
    }

    /// Create a context with an explicit directory implementation.
    ///
    /// Used by tests to run command handlers against an in-memory backend.
    pub fn with_directory(
        settings: LatchSettings,
        directory: Arc<dyn PermissionDirectory>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            directory,
        }
    }

    /// Access the loaded settings.
    pub fn settings(&self) -> &LatchSettings {
        &self.settings
    }

    /// Get a handle to the permission directory.
    pub fn directory(&self) -> Arc<dyn PermissionDirectory> {
        Arc::clone(&self.directory)
    }

    /// The role code that bypasses grant lookups.
    pub fn admin_role_code(&self) -> &str {
        &self.settings.session.admin_role_code
    }
}

/// Map backend settings onto the directory client configuration.
pub fn directory_config(backend: &BackendSettings) -> DirectoryConfig {
    DirectoryConfig::builder()
        .base_url(&backend.base_url)
        .api_key(backend.api_key.raw())
        .schema(&backend.schema)
        .timeout(Duration::from_secs(backend.timeout_secs))
        .connect_timeout(Duration::from_secs(backend.connect_timeout_secs))
        .max_idle_connections(backend.max_idle_connections)
        .build()
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ConsoleContext`] instances.
#[derive(Default)]
pub struct ContextBuilder {
    config_path: Option<PathBuf>,
    settings: Option<LatchSettings>,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Provide settings directly, bypassing file loading.
    pub fn settings(mut self, settings: LatchSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the context, loading configuration if necessary.
    pub fn build(self) -> CliResult<ConsoleContext> {
        let settings = if let Some(settings) = self.settings {
            settings
        } else if let Some(path) = self.config_path {
            info!(path = %path.display(), "Loading configuration");
            load_config(&path).map_err(|e| {
                CliError::configuration(format!(
                    "Failed to load config from {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            return Err(CliError::configuration("No configuration provided"));
        };

        Ok(ConsoleContext::new(settings))
    }
}
