//! S3 bucket lifecycle commands

use anyhow::Result;
use awskeeper_core::lifecycle::{self, BucketReport};
use awskeeper_core::LifecycleStatus;
use clap::{Args, Subcommand};

use super::report_service_error;
use crate::CommandContext;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// AWS profile to use (SSO profiles included)
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum S3Command {
    /// Print the lifecycle rules of every bucket
    ListLifecycle {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Add the Intelligent-Tiering rule to buckets without a lifecycle policy
    AddIntelligentTiering {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Bucket to process (repeatable); defaults to every bucket
        #[arg(long = "bucket", value_name = "BUCKET")]
        buckets: Vec<String>,
    },
    /// Report which buckets carry a lifecycle rule with the given ID
    VerifyRule {
        /// Rule ID to look for
        #[arg(long, value_name = "ID")]
        rule_id: Option<String>,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Bucket to check (repeatable); defaults to every bucket
        #[arg(long = "bucket", value_name = "BUCKET")]
        buckets: Vec<String>,
    },
}

impl S3Command {
    pub async fn run(self, ctx: &CommandContext) -> Result<bool> {
        let result = match self {
            S3Command::ListLifecycle { profile } => {
                let store = ctx.object_store(profile.profile.as_deref()).await;
                lifecycle::list_lifecycle(&store).await
            }
            S3Command::AddIntelligentTiering { profile, buckets } => {
                let buckets = buckets_or_configured(buckets, ctx);
                let store = ctx.object_store(profile.profile.as_deref()).await;
                lifecycle::apply_intelligent_tiering(&store, &buckets).await
            }
            S3Command::VerifyRule {
                rule_id,
                profile,
                buckets,
            } => {
                let rule_id = rule_id.unwrap_or_else(|| ctx.config.lifecycle.rule_id.clone());
                let buckets = buckets_or_configured(buckets, ctx);
                let store = ctx.object_store(profile.profile.as_deref()).await;
                lifecycle::verify_rule(&store, &rule_id, &buckets).await
            }
        };

        match result {
            Ok(reports) => Ok(print_reports(&reports)),
            Err(e) => report_service_error(e),
        }
    }
}

fn buckets_or_configured(buckets: Vec<String>, ctx: &CommandContext) -> Vec<String> {
    if buckets.is_empty() {
        ctx.config.lifecycle.buckets.clone()
    } else {
        buckets
    }
}

/// One line per bucket; false when any bucket failed
fn print_reports(reports: &[BucketReport]) -> bool {
    for report in reports {
        println!("{}", report);
    }
    !reports
        .iter()
        .any(|r| matches!(r.status, LifecycleStatus::Failed(_)))
}
