//! Snapshot scheduled actions for Redshift Serverless namespaces.

use std::fmt;
use tracing::{info, warn};

use crate::client::ServerlessWarehouse;
use crate::error::{HousekeepingError, Result};
use crate::model::{ScheduledActionInfo, ScheduledActionRequest};

/// Every day at 19:00 UTC
pub const DEFAULT_SCHEDULE: &str = "0 19 * * ? *";
pub const DEFAULT_RETENTION_DAYS: i32 = 7;

/// Prefix of actions created from the command line
pub const CLI_ACTION_PREFIX: &str = "dailysnapshot-";
/// Prefix of actions created by the namespace event handler
pub const EVENT_ACTION_PREFIX: &str = "scheduledsnapshot-";

pub fn default_action_name(namespace_name: &str) -> String {
    format!("{}{}", CLI_ACTION_PREFIX, namespace_name.to_lowercase())
}

pub fn event_action_name(namespace_name: &str) -> String {
    format!("{}{}", EVENT_ACTION_PREFIX, namespace_name.to_lowercase())
}

/// Normalise a cron expression to the parenthesised form the scheduler
/// expects: `0 19 * * ? *`, `(0 19 * * ? *)` and `cron(0 19 * * ? *)` all
/// become `(0 19 * * ? *)`.
pub fn cron_expression(schedule: &str) -> String {
    let trimmed = schedule.trim();
    let inner = trimmed.strip_prefix("cron").unwrap_or(trimmed).trim();
    match inner.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(body) => format!("({})", body.trim()),
        None => format!("({})", inner),
    }
}

/// User-facing description of a snapshot schedule, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct SnapshotSchedule {
    pub namespace_name: String,
    pub role_arn: String,
    pub schedule: Option<String>,
    pub description: String,
    pub retention_period: Option<i32>,
    pub action_name: Option<String>,
}

impl SnapshotSchedule {
    pub fn new(namespace_name: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            namespace_name: namespace_name.into(),
            role_arn: role_arn.into(),
            ..Default::default()
        }
    }

    /// Apply defaults and validate into the request sent to the service
    pub fn into_request(self) -> Result<ScheduledActionRequest> {
        if self.namespace_name.trim().is_empty() {
            return Err(HousekeepingError::invalid(
                "namespace_name",
                "must not be empty",
            ));
        }
        if self.role_arn.trim().is_empty() {
            return Err(HousekeepingError::invalid("role_arn", "must not be empty"));
        }
        let retention_period = self.retention_period.unwrap_or(DEFAULT_RETENTION_DAYS);
        if retention_period <= 0 {
            return Err(HousekeepingError::invalid(
                "retention_period",
                format!("must be a positive number of days, got {}", retention_period),
            ));
        }
        let schedule = self
            .schedule
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());
        let action_name = self
            .action_name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_action_name(&self.namespace_name));

        Ok(ScheduledActionRequest {
            action_name,
            namespace_name: self.namespace_name,
            role_arn: self.role_arn,
            schedule: cron_expression(&schedule),
            description: self.description,
            enabled: true,
            retention_period,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleVerb {
    Create,
    Update,
}

impl ScheduleVerb {
    fn past(&self) -> &'static str {
        match self {
            ScheduleVerb::Create => "created",
            ScheduleVerb::Update => "updated",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            ScheduleVerb::Create => "creation",
            ScheduleVerb::Update => "update",
        }
    }
}

/// Result of a create or update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReport {
    pub verb: ScheduleVerb,
    /// `None` when the service answered without describing the action
    pub action: Option<ScheduledActionInfo>,
}

impl ScheduleReport {
    pub fn succeeded(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Display for ScheduleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(action) = &self.action else {
            return write!(f, "Scheduled action {} failed.", self.verb.noun());
        };
        writeln!(f, "Scheduled action {} successfully!", self.verb.past())?;
        writeln!(f, "Namespace Name: {}", action.namespace_name)?;
        writeln!(f, "Scheduled Action Name: {}", action.action_name)?;
        writeln!(
            f,
            "Next Invocations: [{}]",
            action.next_invocations.join(", ")
        )?;
        write!(f, "State: {}", action.state.as_deref().unwrap_or("UNKNOWN"))
    }
}

pub async fn create_schedule(
    warehouse: &dyn ServerlessWarehouse,
    schedule: SnapshotSchedule,
) -> Result<ScheduleReport> {
    let request = schedule.into_request()?;
    info!(
        namespace = %request.namespace_name,
        action = %request.action_name,
        schedule = %request.schedule,
        "Creating snapshot schedule"
    );
    let action = warehouse.create_scheduled_action(&request).await?;
    Ok(ScheduleReport {
        verb: ScheduleVerb::Create,
        action,
    })
}

pub async fn update_schedule(
    warehouse: &dyn ServerlessWarehouse,
    schedule: SnapshotSchedule,
) -> Result<ScheduleReport> {
    let request = schedule.into_request()?;
    info!(
        namespace = %request.namespace_name,
        action = %request.action_name,
        schedule = %request.schedule,
        "Updating snapshot schedule"
    );
    let action = warehouse.update_scheduled_action(&request).await?;
    Ok(ScheduleReport {
        verb: ScheduleVerb::Update,
        action,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteReport {
    Deleted { action_name: String },
    Failed { action_name: String, reason: String },
}

impl fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteReport::Deleted { .. } => f.write_str("Scheduled action deleted successfully!"),
            DeleteReport::Failed { reason, .. } => {
                write!(f, "Scheduled action deletion failed. {}", reason)
            }
        }
    }
}

/// Delete a scheduled action. Service failures are reported, not returned.
pub async fn delete_schedule(
    warehouse: &dyn ServerlessWarehouse,
    action_name: &str,
) -> DeleteReport {
    match warehouse.delete_scheduled_action(action_name).await {
        Ok(()) => {
            info!(action = %action_name, "Deleted snapshot schedule");
            DeleteReport::Deleted {
                action_name: action_name.to_string(),
            }
        }
        Err(e) => {
            warn!(action = %action_name, error = %e, "Failed to delete snapshot schedule");
            DeleteReport::Failed {
                action_name: action_name.to_string(),
                reason: e.to_string(),
            }
        }
    }
}
