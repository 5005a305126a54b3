// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-config
//!
//! Configuration management for the Latch admin console.
//!
//! This crate provides the configuration schema, multi-format loading,
//! environment variable overrides, and validation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use latch_config::loader::load_config;
//!
//! let settings = load_config("latch.yaml").unwrap();
//!
//! println!("Backend: {}", settings.backend.base_url);
//! println!("Admin role: {}", settings.session.admin_role_code);
//! ```
//!
//! ## Configuration Schema
//!
//! The configuration is organized into the following sections:
//!
//! - `backend` - Backend endpoint, API key, schema, and timeouts
//! - `session` - Admin role code and session behavior
//! - `logging` - Logging configuration
//!
//! ## Environment Variables
//!
//! Configuration values can be overridden via environment variables:
//!
//! ```text
//! LATCH_BACKEND_URL=https://project.example.co/rest/v1
//! LATCH_BACKEND_API_KEY=sb-key
//! LATCH_ADMIN_ROLE=SUPERVISOR
//! LATCH_LOG_LEVEL=debug
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! backend:
//!   api_key: "${LATCH_API_KEY:dev-key}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use schema::{
    // Top-level config
    LatchSettings,
    BackendSettings,
    SessionSettings,
    // Logging config
    LoggingSettings,
    LogLevel,
    LogFormat,
    // Secret value
    SecretValue,
};

pub use loader::{
    ConfigFormat,
    ConfigLoader,
    ConfigLoaderBuilder,
    load_config,
    load_config_str,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Prelude
// =============================================================================

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::loader::{load_config, ConfigLoader};
    pub use crate::schema::{BackendSettings, LatchSettings, SecretValue};
}

// =============================================================================
// Tests
// =============================================================================
