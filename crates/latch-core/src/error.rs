// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for LATCH.
//!
//! This module provides the error types shared across all LATCH components:
//!
//! - [`DirectoryError`]: backend read/write failures (fail-closed on loads)
//! - [`MatrixError`]: grant matrix editing failures
//! - [`LatchError`]: the aggregate root
//!
//! # Design Principles
//!
//! - Structured variants with named fields, never bare strings
//! - Constructor helpers for ergonomic creation at call sites
//! - `user_message()` for operator-facing text, `error_type()` for log keys
//! - Cache loads never propagate these errors to consumers; they deny instead

use thiserror::Error;

// =============================================================================
// Replacement Phases
// =============================================================================

/// The phase of a full-replacement grant write.
///
/// Replacement is delete-then-insert and is not atomic: a failure in the
/// [`ReplacePhase::Insert`] phase leaves the role with zero grants until the
/// caller reconciles by re-fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacePhase {
    /// Deleting the role's existing grant edges.
    Delete,

    /// Inserting the replacement grant edges.
    Insert,
}

impl ReplacePhase {
    /// Returns the phase name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplacePhase::Delete => "delete",
            ReplacePhase::Insert => "insert",
        }
    }
}

impl std::fmt::Display for ReplacePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Directory Errors
// =============================================================================

/// Errors from the permission directory (catalog and grant access).
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The backend connection is not configured (no base URL).
    #[error("Backend connection is not configured")]
    Unconfigured,

    /// The backend is unreachable or a read failed.
    #[error("Permission data unavailable: {message}")]
    Unavailable {
        /// Transport or backend failure detail.
        message: String,
    },

    /// A backend response could not be decoded.
    #[error("Failed to decode backend response: {message}")]
    Decode {
        /// Decode failure detail.
        message: String,
    },

    /// A grant write was requested with a malformed or missing role id.
    #[error("Invalid role id: {role_id}")]
    InvalidRole {
        /// The offending raw role id.
        role_id: i64,
    },

    /// A full-replacement grant write failed.
    ///
    /// When `phase` is [`ReplacePhase::Insert`], the preceding delete already
    /// succeeded and the role holds zero grants until reconciled.
    #[error("Failed to replace grants for role {role_id} during {phase} phase: {message}")]
    ReplaceFailed {
        /// The role whose grants were being replaced.
        role_id: i64,
        /// Which phase of the replacement failed.
        phase: ReplacePhase,
        /// Failure detail.
        message: String,
    },
}

impl DirectoryError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an invalid role error.
    pub fn invalid_role(role_id: i64) -> Self {
        Self::InvalidRole { role_id }
    }

    /// Creates a replacement failure for the given phase.
    pub fn replace_failed(role_id: i64, phase: ReplacePhase, message: impl Into<String>) -> Self {
        Self::ReplaceFailed {
            role_id,
            phase,
            message: message.into(),
        }
    }

    /// Returns `true` if the failure means permission data could not be read.
    ///
    /// These are the failures the cache answers with deny-all.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(
            self,
            DirectoryError::Unconfigured
                | DirectoryError::Unavailable { .. }
                | DirectoryError::Decode { .. }
        )
    }

    /// Returns `true` if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DirectoryError::Unavailable { .. } | DirectoryError::ReplaceFailed { .. }
        )
    }

    /// Returns `true` if the failure left the role with zero grants.
    pub fn left_role_empty(&self) -> bool {
        matches!(
            self,
            DirectoryError::ReplaceFailed {
                phase: ReplacePhase::Insert,
                ..
            }
        )
    }

    /// Returns the error type as a string for logging and stats keys.
    pub fn error_type(&self) -> &'static str {
        match self {
            DirectoryError::Unconfigured => "unconfigured",
            DirectoryError::Unavailable { .. } => "unavailable",
            DirectoryError::Decode { .. } => "decode",
            DirectoryError::InvalidRole { .. } => "invalid_role",
            DirectoryError::ReplaceFailed { .. } => "replace_failed",
        }
    }

    /// Returns a user-friendly error message in Korean.
    pub fn user_message(&self) -> String {
        match self {
            DirectoryError::Unconfigured => "백엔드 연결이 설정되지 않았습니다".to_string(),
            DirectoryError::Unavailable { .. } => "권한 데이터를 불러오지 못했습니다".to_string(),
            DirectoryError::Decode { .. } => "백엔드 응답을 해석할 수 없습니다".to_string(),
            DirectoryError::InvalidRole { role_id } => {
                format!("유효하지 않은 역할 ID입니다: {}", role_id)
            }
            DirectoryError::ReplaceFailed { phase, .. } => match phase {
                ReplacePhase::Delete => "권한 저장에 실패했습니다 (기존 권한 삭제 단계)".to_string(),
                ReplacePhase::Insert => {
                    "권한 저장에 실패했습니다 (새 권한 등록 단계, 역할 권한이 비어 있습니다)"
                        .to_string()
                }
            },
        }
    }
}

/// A Result type with DirectoryError.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

// =============================================================================
// Matrix Errors
// =============================================================================

/// Errors from grant matrix editing.
#[derive(Debug, Clone, Error)]
pub enum MatrixError {
    /// An operation needing a selected role was called without one.
    #[error("No role selected")]
    NoRoleSelected,

    /// A toggle referenced a module the loaded matrix does not contain.
    #[error("Module '{module}' is not in the loaded matrix")]
    UnknownModule {
        /// Module code the toggle named.
        module: String,
    },

    /// A toggle referenced a cell the catalog does not define.
    #[error("Module '{module}' does not define action '{action}'")]
    UnknownCell {
        /// Module code the toggle named.
        module: String,
        /// Action key the toggle named.
        action: String,
    },

    /// A directory operation behind the editor failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl MatrixError {
    /// Creates an unknown module error.
    pub fn unknown_module(module: impl Into<String>) -> Self {
        Self::UnknownModule {
            module: module.into(),
        }
    }

    /// Creates an unknown cell error.
    pub fn unknown_cell(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownCell {
            module: module.into(),
            action: action.into(),
        }
    }

    /// Returns `true` if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MatrixError::NoRoleSelected => false,
            MatrixError::UnknownModule { .. } => false,
            MatrixError::UnknownCell { .. } => false,
            MatrixError::Directory(e) => e.is_retryable(),
        }
    }

    /// Returns the error type as a string for logging and stats keys.
    pub fn error_type(&self) -> &'static str {
        match self {
            MatrixError::NoRoleSelected => "no_role_selected",
            MatrixError::UnknownModule { .. } => "unknown_module",
            MatrixError::UnknownCell { .. } => "unknown_cell",
            MatrixError::Directory(e) => e.error_type(),
        }
    }

    /// Returns a user-friendly error message in Korean.
    pub fn user_message(&self) -> String {
        match self {
            MatrixError::NoRoleSelected => "선택된 역할이 없습니다".to_string(),
            MatrixError::UnknownModule { .. } => "존재하지 않는 모듈입니다".to_string(),
            MatrixError::UnknownCell { .. } => "존재하지 않는 권한 항목입니다".to_string(),
            MatrixError::Directory(e) => e.user_message(),
        }
    }
}

/// A Result type with MatrixError.
pub type MatrixResult<T> = Result<T, MatrixError>;

// =============================================================================
// Root Error
// =============================================================================

/// The aggregate error type for LATCH operations.
#[derive(Debug, Clone, Error)]
pub enum LatchError {
    /// Permission directory failure.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Grant matrix editing failure.
    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// An internal invariant was violated.
    #[error("Internal error: {message}")]
    Internal {
        /// Failure detail.
        message: String,
    },
}

impl LatchError {
    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LatchError::Directory(e) => e.is_retryable(),
            LatchError::Matrix(e) => e.is_retryable(),
            LatchError::Internal { .. } => false,
        }
    }

    /// Returns the error type as a string for logging and stats keys.
    pub fn error_type(&self) -> &'static str {
        match self {
            LatchError::Directory(e) => e.error_type(),
            LatchError::Matrix(e) => e.error_type(),
            LatchError::Internal { .. } => "internal",
        }
    }

    /// Returns a user-friendly error message in Korean.
    pub fn user_message(&self) -> String {
        match self {
            LatchError::Directory(e) => e.user_message(),
            LatchError::Matrix(e) => e.user_message(),
            LatchError::Internal { .. } => "내부 오류가 발생했습니다".to_string(),
        }
    }
}

/// A Result type with LatchError.
pub type LatchResult<T> = Result<T, LatchError>;

// =============================================================================
// Tests
// =============================================================================
