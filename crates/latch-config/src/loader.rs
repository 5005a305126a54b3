// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for the Latch admin console.
//!
//! This module provides functionality to load, parse, validate, and process
//! configuration files in YAML, TOML, and JSON formats. It also supports
//! environment variable overrides.
//!
//! # Loading Pipeline
//!
//! 1. Read the configuration file
//! 2. Resolve environment variable placeholders
//! 3. Parse into [`LatchSettings`]
//! 4. Apply environment variable overrides
//! 5. Validate the result
//!
//! # Environment Variable Override
//!
//! Configuration values can be overridden using environment variables:
//!
//! ```text
//! LATCH_BACKEND_URL=https://project.example.co/rest/v1
//! LATCH_BACKEND_API_KEY=sb-key
//! LATCH_ADMIN_ROLE=SUPERVISOR
//! LATCH_LOG_LEVEL=debug
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LatchSettings, LogFormat, LogLevel, SecretValue};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for the Latch admin console.
///
/// Supports YAML, TOML, and JSON files, `${VAR}` placeholders inside file
/// content, and `LATCH_*` environment variable overrides on top.
///
/// # Examples
///
/// ```no_run
/// use latch_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let settings = loader.load("latch.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables in values.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: "LATCH".to_string(),
            resolve_env_vars: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    ///
    /// # Returns
    ///
    /// * `Ok(LatchSettings)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - If loading, parsing, or validation fails
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<LatchSettings> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut settings = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut settings)?;
        }

        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            "Backend: {} (schema {})",
            settings.backend.base_url, settings.backend.schema
        );

        Ok(settings)
    }

    /// Loads configuration from a string with the specified format.
    pub fn load_from_str(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<LatchSettings> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        let mut settings = self.parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut settings)?;
        }

        settings.validate()?;

        Ok(settings)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Parses content based on format.
    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<LatchSettings> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };

        self.parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Parses a string based on format.
    fn parse_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<LatchSettings> {
        match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
            }
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
            }
        }
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports the format: `${VAR_NAME}` or `${VAR_NAME:default}`
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                // Find the closing '}'
                let mut var_content = String::new();
                let mut found_close = false;

                while let Some(c) = chars.next() {
                    if c == '}' {
                        found_close = true;
                        break;
                    }
                    var_content.push(c);
                }

                if !found_close {
                    // No closing brace, keep as-is
                    result.push('$');
                    result.push('{');
                    result.push_str(&var_content);
                    continue;
                }

                // Parse variable name and default
                let (var_name, default_value) = if let Some(idx) = var_content.find(':') {
                    (&var_content[..idx], Some(&var_content[idx + 1..]))
                } else {
                    (var_content.as_str(), None)
                };

                // Look up environment variable
                match env::var(var_name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        if let Some(default) = default_value {
                            result.push_str(default);
                        } else {
                            // Keep the original placeholder if not found and no default
                            warn!("Environment variable '{}' not found", var_name);
                            result.push_str(&format!("${{{}}}", var_name));
                        }
                    }
                }
            } else {
                result.push(c);
            }
        }

        Ok(result)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, settings: &mut LatchSettings) -> ConfigResult<()> {
        // Apply backend overrides
        if let Ok(value) = env::var(format!("{}_BACKEND_URL", self.env_prefix)) {
            settings.backend.base_url = value;
        }
        if let Ok(value) = env::var(format!("{}_BACKEND_API_KEY", self.env_prefix)) {
            settings.backend.api_key = SecretValue::new(value);
        }
        if let Ok(value) = env::var(format!("{}_BACKEND_SCHEMA", self.env_prefix)) {
            settings.backend.schema = value;
        }
        if let Ok(value) = env::var(format!("{}_BACKEND_TIMEOUT_SECS", self.env_prefix)) {
            settings.backend.timeout_secs = value.parse().map_err(|_| {
                ConfigError::invalid_env_var(
                    format!("{}_BACKEND_TIMEOUT_SECS", self.env_prefix),
                    "expected a number of seconds",
                )
            })?;
        }

        // Apply session overrides
        if let Ok(value) = env::var(format!("{}_ADMIN_ROLE", self.env_prefix)) {
            settings.session.admin_role_code = value;
        }

        // Apply logging overrides
        if let Ok(value) = env::var(format!("{}_LOG_LEVEL", self.env_prefix)) {
            if let Some(level) = parse_log_level(&value) {
                settings.logging.level = level;
            }
        }
        if let Ok(value) = env::var(format!("{}_LOG_FORMAT", self.env_prefix)) {
            if let Some(log_format) = parse_log_format(&value) {
                settings.logging.format = log_format;
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a log level string.
fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

/// Parses a log format string.
fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "pretty" => Some(LogFormat::Pretty),
        "compact" => Some(LogFormat::Compact),
        "full" => Some(LogFormat::Full),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
///
/// This is a convenience function for simple use cases.
///
/// # Examples
///
/// ```no_run
/// use latch_config::loader::load_config;
///
/// let settings = load_config("latch.yaml").unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LatchSettings> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<LatchSettings> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
