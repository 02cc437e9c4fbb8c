// Plain values exchanged with the cloud clients
//
// Adapters convert SDK shapes into these so the operations stay SDK-agnostic.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const INTELLIGENT_TIERING: &str = "INTELLIGENT_TIERING";
pub const STATUS_AVAILABLE: &str = "AVAILABLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    Enabled,
    Disabled,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Enabled => "Enabled",
            RuleStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoncurrentVersionTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_days: Option<i32>,
    pub storage_class: String,
}

/// One rule of a bucket lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRule {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: RuleStatus,
    /// Key prefix filter; `None` means the rule applies to the whole bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub noncurrent_version_transitions: Vec<NoncurrentVersionTransition>,
}

impl LifecycleRule {
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    #[serde(default)]
    pub iam_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl NamespaceInfo {
    pub fn is_available(&self) -> bool {
        self.status.as_deref() == Some(STATUS_AVAILABLE)
    }

    pub fn status_or_unknown(&self) -> &str {
        self.status.as_deref().unwrap_or("UNKNOWN")
    }
}

/// Parameters of a snapshot-creating scheduled action.
///
/// The target action always snapshots `namespace_name` with the namespace
/// name as the snapshot prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActionRequest {
    pub action_name: String,
    pub namespace_name: String,
    pub role_arn: String,
    /// Parenthesised cron expression, e.g. `(0 19 * * ? *)`
    pub schedule: String,
    pub description: String,
    pub enabled: bool,
    pub retention_period: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActionInfo {
    pub namespace_name: String,
    pub action_name: String,
    #[serde(default)]
    pub next_invocations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCopyRequest {
    pub namespace_name: String,
    pub destination_region: String,
    pub retention_period: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub namespace_name: String,
    pub snapshot_name: String,
    pub workgroup_name: String,
}
