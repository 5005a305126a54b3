// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! REST-backed permission directory.
//!
//! [`RestDirectory`] talks to a hosted PostgREST-style endpoint: catalog
//! reads use embedded selects with server-side ordering, grant replacement
//! issues a filtered `DELETE` followed by one bulk `INSERT`. A directory
//! constructed without a base URL stays usable; every operation then fails
//! with [`Unconfigured`](latch_core::error::DirectoryError::Unconfigured)
//! so callers can fall back to deny-all.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use latch_core::error::{DirectoryError, DirectoryResult, ReplacePhase};
use latch_core::types::{ModuleEntry, ModuleGrants, PermissionActionId, Role, RoleId};

use crate::traits::{
    join_role_grants, normalize_action_ids, report_unknown_ids, DirectoryConfig, DirectoryStats,
    DirectoryStatsInner, PermissionDirectory,
};
use crate::wire::{GrantRow, ModuleRow, RoleRow};

// ============================================================================
// Table Layout
// ============================================================================

/// Module catalog table.
const MODULES_TABLE: &str = "permission_modules";

/// Role table.
const ROLES_TABLE: &str = "roles";

/// Role-to-action junction table.
const GRANTS_TABLE: &str = "role_permission_actions";

/// Embedded select for the catalog read.
const MODULE_SELECT: &str =
    "module_code,module_name,group_label,permission_actions(permission_action_id,action_key,action_label,sort_order)";

/// Column select for the role read.
const ROLE_SELECT: &str = "role_id,role_code,role_name,description,status";

/// Column select for the grant read.
const GRANT_SELECT: &str = "role_id,permission_action_id";

// ============================================================================
// REST Directory
// ============================================================================

/// Permission directory backed by a REST endpoint.
#[derive(Debug)]
pub struct RestDirectory {
    /// HTTP client.
    client: reqwest::Client,

    /// Connection settings.
    config: DirectoryConfig,

    /// Operation counters.
    stats: DirectoryStatsInner,
}

impl RestDirectory {
    /// Creates a new REST directory.
    ///
    /// Construction never fails; an empty base URL is reported per call as
    /// `Unconfigured` instead.
    pub fn new(config: DirectoryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_idle_connections)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            stats: DirectoryStatsInner::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    fn ensure_configured(&self) -> DirectoryResult<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(DirectoryError::Unconfigured)
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    async fn fetch_rows<T>(&self, table: &str, query: &[(&str, &str)]) -> DirectoryResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.ensure_configured()?;

        let response = self
            .client
            .get(self.endpoint(table))
            .query(query)
            .header("apikey", &self.config.api_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header("Accept-Profile", &self.config.schema)
            .send()
            .await
            .map_err(|e| DirectoryError::unavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::unavailable(format!(
                "Backend returned error: {} - {}",
                status, body
            )));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DirectoryError::decode(format!("Failed to decode {} rows: {}", table, e)))
    }

    async fn fetch_modules(&self) -> DirectoryResult<Vec<ModuleEntry>> {
        let rows: Vec<ModuleRow> = self
            .fetch_rows(
                MODULES_TABLE,
                &[
                    ("select", MODULE_SELECT),
                    ("order", "module_code.asc"),
                    ("permission_actions.order", "sort_order.asc"),
                ],
            )
            .await?;

        let mut modules: Vec<ModuleEntry> = rows.into_iter().map(ModuleRow::into_entry).collect();
        // Server-side ordering is advisory; the catalog contract is ours.
        modules.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(modules)
    }

    async fn fetch_roles(&self) -> DirectoryResult<Vec<Role>> {
        let rows: Vec<RoleRow> = self
            .fetch_rows(
                ROLES_TABLE,
                &[("select", ROLE_SELECT), ("order", "role_code.asc")],
            )
            .await?;

        let mut roles: Vec<Role> = rows.into_iter().map(RoleRow::into_role).collect();
        roles.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(roles)
    }

    async fn fetch_grants(&self, role_id: RoleId) -> DirectoryResult<Vec<GrantRow>> {
        let filter = format!("eq.{}", role_id.get());
        self.fetch_rows(
            GRANTS_TABLE,
            &[("select", GRANT_SELECT), ("role_id", filter.as_str())],
        )
        .await
    }

    async fn delete_role_grants(&self, role_id: RoleId) -> Result<(), String> {
        let filter = format!("eq.{}", role_id.get());
        let response = self
            .client
            .delete(self.endpoint(GRANTS_TABLE))
            .query(&[("role_id", filter.as_str())])
            .header("apikey", &self.config.api_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header("Content-Profile", &self.config.schema)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(format!("Backend returned error: {} - {}", status, body))
        }
    }

    async fn insert_role_grants(
        &self,
        role_id: RoleId,
        action_ids: &[PermissionActionId],
    ) -> Result<(), String> {
        let rows: Vec<GrantRow> = action_ids
            .iter()
            .map(|id| GrantRow::new(role_id.get(), id.get()))
            .collect();

        let response = self
            .client
            .post(self.endpoint(GRANTS_TABLE))
            .json(&rows)
            .header("apikey", &self.config.api_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header("Content-Profile", &self.config.schema)
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(format!("Backend returned error: {} - {}", status, body))
        }
    }
}

#[async_trait::async_trait]
impl PermissionDirectory for RestDirectory {
    async fn list_modules(&self) -> DirectoryResult<Vec<ModuleEntry>> {
        let result = self.fetch_modules().await;
        match &result {
            Ok(modules) => {
                debug!(modules = modules.len(), "Fetched module catalog");
                self.stats.record_catalog_read();
            }
            Err(e) => {
                warn!(error = %e, "Module catalog read failed");
                self.stats.record_read_failure();
            }
        }
        result
    }

    async fn list_roles(&self) -> DirectoryResult<Vec<Role>> {
        let result = self.fetch_roles().await;
        match &result {
            Ok(roles) => {
                debug!(roles = roles.len(), "Fetched role list");
                self.stats.record_role_read();
            }
            Err(e) => {
                warn!(error = %e, "Role list read failed");
                self.stats.record_read_failure();
            }
        }
        result
    }

    async fn role_permissions(
        &self,
        role_id: Option<RoleId>,
    ) -> DirectoryResult<Vec<ModuleGrants>> {
        let id = match role_id {
            Some(id) if id.is_valid() => id,
            _ => {
                debug!("No usable role selected, returning empty grant matrix");
                return Ok(Vec::new());
            }
        };

        let modules = self.list_modules().await?;

        let grants = match self.fetch_grants(id).await {
            Ok(rows) => {
                self.stats.record_grant_read();
                rows
            }
            Err(e) => {
                warn!(role_id = id.get(), error = %e, "Grant read failed");
                self.stats.record_read_failure();
                return Err(e);
            }
        };

        let granted: HashSet<PermissionActionId> =
            grants.iter().map(GrantRow::action_id).collect();
        let (rows, unknown) = join_role_grants(&modules, &granted);
        report_unknown_ids(&self.stats, id, &unknown);

        debug!(
            role_id = id.get(),
            modules = rows.len(),
            granted = granted.len(),
            "Joined role grant matrix"
        );
        Ok(rows)
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        action_ids: &[PermissionActionId],
    ) -> DirectoryResult<()> {
        if !role_id.is_valid() {
            return Err(DirectoryError::invalid_role(role_id.get()));
        }
        if let Err(e) = self.ensure_configured() {
            self.stats.record_write_failure();
            return Err(e);
        }

        let ids = normalize_action_ids(action_ids);
        let op_id = Uuid::now_v7();
        debug!(
            %op_id,
            role_id = role_id.get(),
            grants = ids.len(),
            "Replacing role grant set"
        );

        if let Err(message) = self.delete_role_grants(role_id).await {
            warn!(%op_id, role_id = role_id.get(), error = %message, "Grant delete phase failed");
            self.stats.record_write_failure();
            return Err(DirectoryError::replace_failed(
                role_id.get(),
                ReplacePhase::Delete,
                message,
            ));
        }

        if !ids.is_empty() {
            if let Err(message) = self.insert_role_grants(role_id, &ids).await {
                warn!(%op_id, role_id = role_id.get(), error = %message, "Grant insert phase failed");
                self.stats.record_write_failure();
                return Err(DirectoryError::replace_failed(
                    role_id.get(),
                    ReplacePhase::Insert,
                    message,
                ));
            }
        }

        self.stats.record_replace_write();
        debug!(%op_id, role_id = role_id.get(), "Role grant set replaced");
        Ok(())
    }

    fn stats(&self) -> DirectoryStats {
        self.stats.snapshot()
    }
}

// ============================================================================
// Tests
// ============================================================================
