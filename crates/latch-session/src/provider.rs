// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session identity for the signed-in console user.
//!
//! The permission cache never authenticates anyone; it only asks a
//! [`SessionProvider`] who is signed in right now. The provider must answer
//! synchronously so capability checks stay cheap enough for per-render use.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use latch_core::types::{RoleCode, RoleId};

// ============================================================================
// Session User
// ============================================================================

/// The identity attached to a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend user id.
    pub id: String,

    /// Sign-in email, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Numeric id of the user's role, if one is assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,

    /// Code of the user's role, if one is assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_code: Option<RoleCode>,
}

impl SessionUser {
    /// Creates a user with no role assignment.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            role_id: None,
            role_code: None,
        }
    }

    /// Sets the sign-in email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Assigns a role by id and code.
    pub fn with_role(mut self, id: impl Into<RoleId>, code: impl Into<RoleCode>) -> Self {
        self.role_id = Some(id.into());
        self.role_code = Some(code.into());
        self
    }

    /// Returns `true` if a role is assigned.
    pub fn has_role(&self) -> bool {
        self.role_id.is_some()
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Point-in-time view of the session.
///
/// `resolving` is `true` while the auth layer is still restoring a session
/// (e.g. validating a stored token). Consumers must treat a resolving
/// session as "unknown", not as signed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The signed-in user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,

    /// Whether session restoration is still in flight.
    #[serde(default)]
    pub resolving: bool,
}

impl SessionState {
    /// A signed-out session.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            resolving: false,
        }
    }

    /// A session still being restored.
    pub fn resolving() -> Self {
        Self {
            user: None,
            resolving: true,
        }
    }

    /// A signed-in session.
    pub fn with_user(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            resolving: false,
        }
    }

    /// Returns `true` if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user's role id, if any.
    pub fn role_id(&self) -> Option<RoleId> {
        self.user.as_ref().and_then(|u| u.role_id)
    }

    /// The signed-in user's role code, if any.
    pub fn role_code(&self) -> Option<&RoleCode> {
        self.user.as_ref().and_then(|u| u.role_code.as_ref())
    }
}

// ============================================================================
// Session Provider
// ============================================================================

/// Source of the current session state.
///
/// Implementations answer synchronously; anything that needs I/O should
/// resolve it elsewhere and hand the result to a provider.
pub trait SessionProvider: Send + Sync + std::fmt::Debug {
    /// The session as of this instant.
    fn state(&self) -> SessionState;
}

/// A provider holding an explicitly managed session.
///
/// This is the provider used by the CLI and by tests: the session changes
/// only when a caller sets it.
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    state: RwLock<SessionState>,
}

impl StaticSessionProvider {
    /// Creates a provider with the given initial state.
    pub fn new(state: SessionState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Creates a signed-out provider.
    pub fn anonymous() -> Self {
        Self::new(SessionState::anonymous())
    }

    /// Creates a provider whose session is still being restored.
    pub fn resolving() -> Self {
        Self::new(SessionState::resolving())
    }

    /// Signs the given user in.
    pub fn set_user(&self, user: SessionUser) {
        *self.state.write() = SessionState::with_user(user);
    }

    /// Marks the session as resolving or settled.
    pub fn set_resolving(&self, resolving: bool) {
        self.state.write().resolving = resolving;
    }

    /// Signs out.
    pub fn clear(&self) {
        *self.state.write() = SessionState::anonymous();
    }
}

impl SessionProvider for StaticSessionProvider {
    fn state(&self) -> SessionState {
        self.state.read().clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
