//! Restore a namespace from a snapshot.

use std::fmt;
use tracing::{info, warn};

use crate::client::ServerlessWarehouse;
use crate::error::{HousekeepingError, ServiceError, CONFLICT, RESOURCE_NOT_FOUND};
use crate::model::{NamespaceInfo, RestoreRequest};

/// Workgroup name used when none is given
pub fn default_workgroup_name(namespace_name: &str) -> String {
    format!("{}-workgroup", namespace_name)
}

impl RestoreRequest {
    pub fn new(
        namespace_name: impl Into<String>,
        snapshot_name: impl Into<String>,
        workgroup_name: Option<String>,
    ) -> Self {
        let namespace_name = namespace_name.into();
        let workgroup_name = workgroup_name
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| default_workgroup_name(&namespace_name));
        Self {
            namespace_name,
            snapshot_name: snapshot_name.into(),
            workgroup_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreReport {
    Restored(NamespaceInfo),
    /// The service answered without describing the namespace
    Incomplete,
    SnapshotNotFound { snapshot_name: String },
    WorkgroupNotFound { workgroup_name: String },
    InProgress,
    Failed { reason: String },
}

impl RestoreReport {
    pub fn succeeded(&self) -> bool {
        matches!(self, RestoreReport::Restored(_))
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreReport::Restored(ns) => {
                writeln!(f, "Namespace restored successfully!")?;
                writeln!(f, "Namespace Name: {}", ns.name)?;
                writeln!(f, "Database Name: {}", ns.db_name.as_deref().unwrap_or(""))?;
                writeln!(f, "IAM Roles: [{}]", ns.iam_roles.join(", "))?;
                write!(f, "Status: {}", ns.status_or_unknown())
            }
            RestoreReport::Incomplete => f.write_str("Namespace restoration failed."),
            RestoreReport::SnapshotNotFound { snapshot_name } => {
                write!(f, "Error: Snapshot '{}' not found.", snapshot_name)
            }
            RestoreReport::WorkgroupNotFound { workgroup_name } => {
                write!(f, "Error: Serverless workgroup '{}' not found.", workgroup_name)
            }
            RestoreReport::InProgress => f.write_str(
                "Error: Restore is in progress. Please check your serverless state or retry later.",
            ),
            RestoreReport::Failed { reason } => write!(f, "Error: {}", reason),
        }
    }
}

/// Map a restore failure to the report the operator sees
pub fn classify_restore_error(request: &RestoreRequest, error: &ServiceError) -> RestoreReport {
    if error.is_code(RESOURCE_NOT_FOUND) {
        if error.mentions("snapshot") {
            return RestoreReport::SnapshotNotFound {
                snapshot_name: request.snapshot_name.clone(),
            };
        }
        if error.mentions("workgroup") {
            return RestoreReport::WorkgroupNotFound {
                workgroup_name: request.workgroup_name.clone(),
            };
        }
    } else if error.is_code(CONFLICT) {
        return RestoreReport::InProgress;
    }
    RestoreReport::Failed {
        reason: error.to_string(),
    }
}

pub async fn restore_namespace(
    warehouse: &dyn ServerlessWarehouse,
    request: &RestoreRequest,
) -> Result<RestoreReport, HousekeepingError> {
    if request.snapshot_name.trim().is_empty() {
        return Err(HousekeepingError::invalid(
            "snapshot_name",
            "must not be empty",
        ));
    }

    info!(
        namespace = %request.namespace_name,
        snapshot = %request.snapshot_name,
        workgroup = %request.workgroup_name,
        "Restoring namespace from snapshot"
    );

    match warehouse.restore_from_snapshot(request).await {
        Ok(Some(ns)) => Ok(RestoreReport::Restored(ns)),
        Ok(None) => Ok(RestoreReport::Incomplete),
        Err(e) => {
            warn!(namespace = %request.namespace_name, error = %e, "Restore failed");
            Ok(classify_restore_error(request, &e))
        }
    }
}
