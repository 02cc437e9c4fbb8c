//! Redshift Serverless snapshot schedule commands

use anyhow::{Context, Result};
use awskeeper_core::restore::restore_namespace;
use awskeeper_core::schedule::{
    create_schedule, default_action_name, delete_schedule, update_schedule, DeleteReport,
};
use awskeeper_core::{RestoreRequest, SnapshotSchedule};
use clap::{Args, Subcommand};
use tracing::debug;

use super::report_service_error;
use crate::CommandContext;

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Namespace to snapshot
    #[arg(long, value_name = "NAME")]
    pub namespace_name: String,

    /// AWS SSO profile to use
    #[arg(long, value_name = "PROFILE")]
    pub sso_profile: String,

    /// IAM role the scheduler assumes to take snapshots
    #[arg(long, value_name = "ARN")]
    pub role_arn: Option<String>,

    /// Description of the scheduled action
    #[arg(long)]
    pub description: Option<String>,

    /// Cron expression, e.g. "0 19 * * ? *"
    #[arg(long, value_name = "CRON")]
    pub schedule: Option<String>,

    /// Days to keep each snapshot
    #[arg(long, value_name = "DAYS")]
    pub retention_period: Option<i32>,

    /// Scheduled action name [default: dailysnapshot-<namespace>]
    #[arg(long, value_name = "NAME")]
    pub action_name: Option<String>,
}

impl ScheduleArgs {
    /// Merge flags over the `[scheduler]` config section
    fn into_schedule(self, ctx: &CommandContext) -> Result<SnapshotSchedule> {
        let defaults = &ctx.config.scheduler;
        let role_arn = self
            .role_arn
            .or_else(|| defaults.role_arn.clone())
            .context("No role ARN given: pass --role-arn or set scheduler.role_arn")?;

        Ok(SnapshotSchedule {
            namespace_name: self.namespace_name,
            role_arn,
            schedule: Some(self.schedule.unwrap_or_else(|| defaults.schedule.clone())),
            description: self
                .description
                .unwrap_or_else(|| defaults.description.clone()),
            retention_period: Some(self.retention_period.unwrap_or(defaults.retention_period)),
            action_name: self.action_name,
        })
    }
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(long, value_name = "NAME")]
    pub namespace_name: String,

    #[arg(long, value_name = "PROFILE")]
    pub sso_profile: String,

    /// Scheduled action name [default: dailysnapshot-<namespace>]
    #[arg(long, value_name = "NAME")]
    pub action_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Namespace to restore into
    #[arg(long, value_name = "NAME")]
    pub namespace_name: String,

    #[arg(long, value_name = "PROFILE")]
    pub sso_profile: String,

    /// Snapshot to restore from
    #[arg(long, value_name = "NAME")]
    pub snapshot_name: String,

    /// Target workgroup [default: <namespace>-workgroup]
    #[arg(long, value_name = "NAME")]
    pub workgroup_name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    /// Create a daily snapshot schedule for a namespace
    Create(ScheduleArgs),
    /// Update an existing snapshot schedule
    Update(ScheduleArgs),
    /// Delete a snapshot schedule
    Delete(DeleteArgs),
    /// Restore a namespace from a snapshot
    Restore(RestoreArgs),
}

impl SnapshotCommand {
    pub async fn run(self, ctx: &CommandContext) -> Result<bool> {
        match self {
            SnapshotCommand::Create(args) => {
                let profile = args.sso_profile.clone();
                let schedule = args.into_schedule(ctx)?;
                let warehouse = ctx.warehouse(Some(&profile)).await;
                match create_schedule(&warehouse, schedule).await {
                    Ok(report) => {
                        println!("{}", report);
                        Ok(report.succeeded())
                    }
                    Err(e) => report_service_error(e),
                }
            }
            SnapshotCommand::Update(args) => {
                let profile = args.sso_profile.clone();
                let schedule = args.into_schedule(ctx)?;
                let warehouse = ctx.warehouse(Some(&profile)).await;
                match update_schedule(&warehouse, schedule).await {
                    Ok(report) => {
                        println!("{}", report);
                        Ok(report.succeeded())
                    }
                    Err(e) => report_service_error(e),
                }
            }
            SnapshotCommand::Delete(args) => {
                let action_name = args
                    .action_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| default_action_name(&args.namespace_name));
                debug!(action = %action_name, "Resolved scheduled action name");
                let warehouse = ctx.warehouse(Some(&args.sso_profile)).await;
                let report = delete_schedule(&warehouse, &action_name).await;
                println!("{}", report);
                Ok(matches!(report, DeleteReport::Deleted { .. }))
            }
            SnapshotCommand::Restore(args) => {
                let request =
                    RestoreRequest::new(args.namespace_name, args.snapshot_name, args.workgroup_name);
                let warehouse = ctx.warehouse(Some(&args.sso_profile)).await;
                let report = restore_namespace(&warehouse, &request).await?;
                println!("{}", report);
                Ok(report.succeeded())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awskeeper_config::{Platform, RuntimeConfig};

    fn args() -> ScheduleArgs {
        ScheduleArgs {
            namespace_name: "sales".into(),
            sso_profile: "pai-non-prod".into(),
            role_arn: None,
            description: None,
            schedule: None,
            retention_period: None,
            action_name: None,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = RuntimeConfig::from_platform_defaults(Platform::Cli);
        config.scheduler.role_arn = Some("arn:aws:iam::123:role/config".into());
        config.scheduler.retention_period = 14;
        let ctx = CommandContext::new(config);

        let schedule = ScheduleArgs {
            role_arn: Some("arn:aws:iam::123:role/flag".into()),
            ..args()
        }
        .into_schedule(&ctx)
        .unwrap();
        assert_eq!(schedule.role_arn, "arn:aws:iam::123:role/flag");
        assert_eq!(schedule.retention_period, Some(14));
        assert_eq!(schedule.schedule.as_deref(), Some("0 19 * * ? *"));
    }

    #[test]
    fn test_role_arn_required() {
        let ctx = CommandContext::new(RuntimeConfig::from_platform_defaults(Platform::Cli));
        let err = args().into_schedule(&ctx).unwrap_err();
        assert!(err.to_string().contains("--role-arn"));
    }
}
