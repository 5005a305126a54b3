// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! High-level test harness for running integration tests with proper setup and teardown.
//!
//! ## Design Principles
//!
//! - Automatic resource management
//! - Consistent test environment setup
//! - Parallel test isolation
//! - Easy cleanup on test completion or failure

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use latch_directory::MemoryDirectory;
use latch_session::{PermissionCache, StaticSessionProvider};

use crate::common::fixtures::DirectoryFixtures;

// =============================================================================
// Test Harness
// =============================================================================

/// Configuration for the test harness.
#[derive(Debug, Clone)]
pub struct TestHarnessConfig {
    /// Name of the test (used for logging and temp directories).
    pub test_name: String,

    /// Timeout for the entire test.
    pub timeout: Duration,

    /// Role code the permission cache treats as administrator.
    pub admin_role_code: String,

    /// Whether to create a temp directory for the test.
    pub create_temp_dir: bool,

    /// Whether to enable tracing for the test.
    pub enable_tracing: bool,
}

impl Default for TestHarnessConfig {
    fn default() -> Self {
        Self {
            test_name: "unknown_test".to_string(),
            timeout: Duration::from_secs(30),
            admin_role_code: "ADMIN".to_string(),
            create_temp_dir: false,
            enable_tracing: false,
        }
    }
}

impl TestHarnessConfig {
    /// Create a new config with a test name.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            ..Default::default()
        }
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the admin role code.
    pub fn admin_role_code(mut self, code: impl Into<String>) -> Self {
        self.admin_role_code = code.into();
        self
    }

    /// Enable temp directory creation.
    pub fn with_temp_dir(mut self) -> Self {
        self.create_temp_dir = true;
        self
    }

    /// Enable tracing.
    pub fn with_tracing(mut self) -> Self {
        self.enable_tracing = true;
        self
    }
}

/// Resources provided by the test harness.
pub struct TestResources {
    /// Configuration used to create this harness.
    pub config: TestHarnessConfig,

    /// Pre-seeded in-memory directory (standard catalog and roles).
    pub directory: Arc<MemoryDirectory>,

    /// Session provider, initially signed out.
    pub provider: Arc<StaticSessionProvider>,

    /// Permission cache wired to the directory and provider.
    pub cache: Arc<PermissionCache>,

    /// Temporary directory (if created).
    temp_dir: Option<TempDir>,
}

impl TestResources {
    /// Get the temp directory path.
    pub fn temp_path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().to_path_buf())
    }

    /// Create a file path in the temp directory.
    pub fn temp_file(&self, name: &str) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join(name))
    }
}

/// The main test harness.
pub struct TestHarness {
    config: TestHarnessConfig,
}

impl TestHarness {
    /// Create a new test harness with a config.
    pub fn new(config: TestHarnessConfig) -> Self {
        Self { config }
    }

    /// Create a new test harness with a test name.
    pub fn with_name(test_name: impl Into<String>) -> Self {
        Self::new(TestHarnessConfig::new(test_name))
    }

    /// Set up the test environment.
    pub fn setup(self) -> TestResources {
        // Initialize tracing if requested
        if self.config.enable_tracing {
            let _ = tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
                )
                .try_init();
        }

        // Create temp directory if requested
        let temp_dir = if self.config.create_temp_dir {
            Some(
                tempfile::Builder::new()
                    .prefix(&format!("latch_test_{}_", self.config.test_name))
                    .tempdir()
                    .expect("Failed to create temp directory"),
            )
        } else {
            None
        };

        let directory = Arc::new(DirectoryFixtures::seeded());
        let provider = Arc::new(StaticSessionProvider::anonymous());
        let cache = Arc::new(PermissionCache::new(
            provider.clone(),
            directory.clone(),
            self.config.admin_role_code.clone(),
        ));

        TestResources {
            config: self.config,
            directory,
            provider,
            cache,
            temp_dir,
        }
    }

    /// Run a test with automatic setup and teardown.
    pub async fn run<F, Fut>(self, test_fn: F)
    where
        F: FnOnce(TestResources) -> Fut,
        Fut: Future<Output = ()>,
    {
        let timeout = self.config.timeout;
        let resources = self.setup();

        // Run the test with a timeout
        let result = tokio::time::timeout(timeout, test_fn(resources)).await;

        if result.is_err() {
            panic!("Test timed out after {:?}", timeout);
        }
    }
}

// =============================================================================
// Concurrent Test Helper
// =============================================================================

/// Helper for running concurrent tests.
pub struct ConcurrentTestHelper {
    /// Number of concurrent tasks.
    task_count: usize,

    /// Timeout per task.
    task_timeout: Duration,
}

impl ConcurrentTestHelper {
    /// Create a new helper.
    pub fn new(task_count: usize) -> Self {
        Self {
            task_count,
            task_timeout: Duration::from_secs(10),
        }
    }

    /// Set the task timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Run a function concurrently and collect results.
    pub async fn run<F, Fut, T>(&self, task_fn: F) -> Vec<Result<T, String>>
    where
        F: Fn(usize) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(self.task_count);

        for i in 0..self.task_count {
            let task_fn = task_fn.clone();
            let timeout = self.task_timeout;

            handles.push(tokio::spawn(async move {
                match tokio::time::timeout(timeout, task_fn(i)).await {
                    Ok(result) => Ok(result),
                    Err(_) => Err(format!("Task {} timed out", i)),
                }
            }));
        }

        let mut results = Vec::with_capacity(self.task_count);
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => results.push(Err(format!("Task panicked: {}", e))),
            }
        }

        results
    }

    /// Run a function concurrently and assert all succeed.
    pub async fn run_all_succeed<F, Fut, T>(&self, task_fn: F) -> Vec<T>
    where
        F: Fn(usize) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let results = self.run(task_fn).await;
        results
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.unwrap_or_else(|e| panic!("Task {} failed: {}", i, e)))
            .collect()
    }
}

// =============================================================================
// Async Assertion Wrapper
// =============================================================================

/// Wraps async assertions with better error messages.
pub async fn assert_async<F, Fut>(
    description: &str,
    timeout: Duration,
    assertion: F,
) -> Result<(), String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = bool>,
{
    match tokio::time::timeout(timeout, assertion()).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(format!("Assertion failed: {}", description)),
        Err(_) => Err(format!(
            "Assertion timed out after {:?}: {}",
            timeout, description
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
