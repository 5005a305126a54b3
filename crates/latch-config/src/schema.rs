// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for the Latch admin console.
//!
//! This module defines the complete configuration structure for Latch,
//! including backend connection settings, session settings, and logging
//! settings.
//!
//! # Schema Structure
//!
//! ```text
//! LatchSettings
//! ├── backend: BackendSettings
//! ├── session: SessionSettings
//! └── logging: LoggingSettings
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Default backend schema name.
pub const DEFAULT_SCHEMA: &str = "public";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Minimum request timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Maximum request timeout in seconds (5 minutes).
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Minimum connect timeout in seconds.
pub const MIN_CONNECT_TIMEOUT_SECS: u64 = 1;

/// Maximum connect timeout in seconds.
pub const MAX_CONNECT_TIMEOUT_SECS: u64 = 60;

/// Default maximum idle connections per host.
pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 10;

/// Maximum allowed idle connections per host.
pub const MAX_IDLE_CONNECTIONS_LIMIT: usize = 64;

/// Default admin role code.
pub const DEFAULT_ADMIN_ROLE_CODE: &str = "ADMIN";

/// Maximum role code length.
pub const MAX_ROLE_CODE_LENGTH: usize = 32;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for the Latch admin console.
///
/// This structure contains everything needed to run a Latch session:
/// backend connection settings, session behavior, and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatchSettings {
    /// Backend connection settings.
    pub backend: BackendSettings,

    /// Session settings.
    #[serde(default)]
    pub session: SessionSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl LatchSettings {
    /// Validates the entire configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if validation fails
    pub fn validate(&self) -> ConfigResult<()> {
        self.backend.validate()?;
        self.session.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Creates settings suitable for tests: a local backend with short
    /// timeouts and a static key.
    pub fn for_testing() -> Self {
        Self {
            backend: BackendSettings::for_testing(),
            session: SessionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LatchSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            session: SessionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

// =============================================================================
// Backend Configuration
// =============================================================================

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSettings {
    /// Base URL of the backend REST endpoint.
    pub base_url: String,

    /// Project API key sent with every request.
    pub api_key: SecretValue,

    /// Database schema the permission tables live in.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum idle connections kept per host.
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_max_idle_connections() -> usize {
    DEFAULT_MAX_IDLE_CONNECTIONS
}

impl BackendSettings {
    /// Validates the backend settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::validation("backend.base_url", "cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::validation(
                "backend.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::missing_field("backend.api_key"));
        }
        if self.schema.is_empty() {
            return Err(ConfigError::validation("backend.schema", "cannot be empty"));
        }
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::out_of_range(
                "backend.timeout_secs",
                self.timeout_secs,
                MIN_TIMEOUT_SECS,
                MAX_TIMEOUT_SECS,
            ));
        }
        if !(MIN_CONNECT_TIMEOUT_SECS..=MAX_CONNECT_TIMEOUT_SECS)
            .contains(&self.connect_timeout_secs)
        {
            return Err(ConfigError::out_of_range(
                "backend.connect_timeout_secs",
                self.connect_timeout_secs,
                MIN_CONNECT_TIMEOUT_SECS,
                MAX_CONNECT_TIMEOUT_SECS,
            ));
        }
        if self.max_idle_connections == 0 || self.max_idle_connections > MAX_IDLE_CONNECTIONS_LIMIT
        {
            return Err(ConfigError::out_of_range(
                "backend.max_idle_connections",
                self.max_idle_connections,
                1,
                MAX_IDLE_CONNECTIONS_LIMIT,
            ));
        }
        Ok(())
    }

    /// Creates backend settings pointing at a local test instance.
    pub fn for_testing() -> Self {
        Self {
            base_url: "http://localhost:54321/rest/v1".to_string(),
            api_key: SecretValue::new("test-key"),
            schema: default_schema(),
            timeout_secs: 1,
            connect_timeout_secs: 1,
            max_idle_connections: 2,
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: SecretValue::new(""),
            schema: default_schema(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSettings {
    /// Role code granted unconditional access.
    #[serde(default = "default_admin_role_code")]
    pub admin_role_code: String,
}

fn default_admin_role_code() -> String {
    DEFAULT_ADMIN_ROLE_CODE.to_string()
}

impl SessionSettings {
    /// Validates the session settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.admin_role_code.is_empty() {
            return Err(ConfigError::validation(
                "session.admin_role_code",
                "cannot be empty",
            ));
        }
        if self.admin_role_code.len() > MAX_ROLE_CODE_LENGTH {
            return Err(ConfigError::validation(
                "session.admin_role_code",
                "cannot exceed 32 characters",
            ));
        }
        Ok(())
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            admin_role_code: default_admin_role_code(),
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include span targets in logs.
    #[serde(default = "default_enabled")]
    pub with_target: bool,
}

fn default_enabled() -> bool {
    true
}

impl LoggingSettings {
    /// Validates the logging settings.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing Level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty format for development.
    #[default]
    Pretty,
    /// Compact format.
    Compact,
    /// Full format with all details.
    Full,
    /// JSON format for production.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret configuration value.
///
/// The value round-trips through serde unchanged but never appears in
/// `Display` or `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretValue").field(&"***").finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
