//! Bucket lifecycle housekeeping: listing rules, adding the Intelligent-Tiering
//! rule, and checking whether a named rule is present.
//!
//! A failure on one bucket never aborts the run; it is folded into that
//! bucket's [`BucketReport`]. Only a failure to list buckets is an error.

use std::fmt;
use tracing::{debug, info, warn};

use crate::client::ObjectStore;
use crate::error::{Result, ServiceError, NO_SUCH_LIFECYCLE_CONFIGURATION};
use crate::model::{
    LifecycleRule, NoncurrentVersionTransition, RuleStatus, Transition, INTELLIGENT_TIERING,
};

/// ID of the rule added by [`apply_intelligent_tiering`]
pub const DEFAULT_RULE_ID: &str = "S3_storageClass";

/// What a lifecycle operation found or did for one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleStatus {
    /// Existing rules, left untouched
    Rules(Vec<LifecycleRule>),
    NoPolicy,
    PolicyExists,
    RuleAdded,
    Failed(String),
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStatus::Rules(rules) => {
                let json = serde_json::to_string(rules).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            LifecycleStatus::NoPolicy => f.write_str("No Policy"),
            LifecycleStatus::PolicyExists => f.write_str("Policy Exists"),
            LifecycleStatus::RuleAdded => write!(f, "{} rule added", INTELLIGENT_TIERING),
            LifecycleStatus::Failed(reason) => write!(f, "Error: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketReport {
    pub bucket: String,
    pub status: LifecycleStatus,
}

impl BucketReport {
    fn new(bucket: impl Into<String>, status: LifecycleStatus) -> Self {
        Self {
            bucket: bucket.into(),
            status,
        }
    }
}

impl fmt::Display for BucketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.bucket, self.status)
    }
}

/// The rule added to buckets without a lifecycle configuration: move current
/// and noncurrent object versions to Intelligent-Tiering immediately.
pub fn intelligent_tiering_rule() -> LifecycleRule {
    LifecycleRule {
        id: Some(DEFAULT_RULE_ID.to_string()),
        status: RuleStatus::Enabled,
        prefix: None,
        transitions: vec![Transition {
            days: Some(0),
            storage_class: INTELLIGENT_TIERING.to_string(),
        }],
        noncurrent_version_transitions: vec![NoncurrentVersionTransition {
            noncurrent_days: Some(0),
            storage_class: INTELLIGENT_TIERING.to_string(),
        }],
    }
}

/// Report the lifecycle rules of every bucket
pub async fn list_lifecycle(store: &dyn ObjectStore) -> Result<Vec<BucketReport>> {
    let buckets = store.list_buckets().await?;
    info!(bucket_count = buckets.len(), "Listing bucket lifecycle rules");

    let mut reports = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let status = match store.lifecycle_rules(&bucket).await {
            Ok(Some(rules)) => LifecycleStatus::Rules(rules),
            Ok(None) => LifecycleStatus::NoPolicy,
            Err(e) => {
                debug!(bucket = %bucket, error = %e, "Lifecycle fetch failed, treating as no policy");
                LifecycleStatus::NoPolicy
            }
        };
        reports.push(BucketReport::new(bucket, status));
    }
    Ok(reports)
}

/// Add the Intelligent-Tiering rule to every bucket that has no lifecycle
/// configuration. `buckets` restricts the run; empty means all buckets.
pub async fn apply_intelligent_tiering(
    store: &dyn ObjectStore,
    buckets: &[String],
) -> Result<Vec<BucketReport>> {
    let buckets = resolve_buckets(store, buckets).await?;
    let rule = intelligent_tiering_rule();

    let mut reports = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let status = match store.lifecycle_rules(&bucket).await {
            Ok(Some(rules)) => LifecycleStatus::Rules(rules),
            Ok(None) => put_rule(store, &bucket, &rule).await,
            Err(e) if e.is_code(NO_SUCH_LIFECYCLE_CONFIGURATION) => {
                put_rule(store, &bucket, &rule).await
            }
            Err(e) => {
                warn!(bucket = %bucket, error = %e, "Could not read lifecycle configuration");
                LifecycleStatus::Failed(e.to_string())
            }
        };
        reports.push(BucketReport::new(bucket, status));
    }
    Ok(reports)
}

async fn put_rule(store: &dyn ObjectStore, bucket: &str, rule: &LifecycleRule) -> LifecycleStatus {
    match store
        .put_lifecycle_rules(bucket, std::slice::from_ref(rule))
        .await
    {
        Ok(()) => {
            info!(bucket = %bucket, "Added {} lifecycle rule", INTELLIGENT_TIERING);
            LifecycleStatus::RuleAdded
        }
        Err(e) => {
            warn!(bucket = %bucket, error = %e, "Failed to put lifecycle configuration");
            LifecycleStatus::Failed(e.to_string())
        }
    }
}

/// Check every bucket for a rule with ID `rule_id`. `buckets` restricts the
/// run; empty means all buckets.
pub async fn verify_rule(
    store: &dyn ObjectStore,
    rule_id: &str,
    buckets: &[String],
) -> Result<Vec<BucketReport>> {
    let buckets = resolve_buckets(store, buckets).await?;
    info!(rule_id, bucket_count = buckets.len(), "Verifying lifecycle rule");

    let mut reports = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let status = match store.lifecycle_rules(&bucket).await {
            Ok(Some(rules)) if rules.iter().any(|rule| rule.has_id(rule_id)) => {
                LifecycleStatus::PolicyExists
            }
            Ok(Some(rules)) => LifecycleStatus::Rules(rules),
            Ok(None) => LifecycleStatus::NoPolicy,
            Err(e) => {
                debug!(bucket = %bucket, error = %e, "Lifecycle fetch failed, treating as no policy");
                LifecycleStatus::NoPolicy
            }
        };
        reports.push(BucketReport::new(bucket, status));
    }
    Ok(reports)
}

async fn resolve_buckets(
    store: &dyn ObjectStore,
    buckets: &[String],
) -> Result<Vec<String>, ServiceError> {
    if buckets.is_empty() {
        store.list_buckets().await
    } else {
        Ok(buckets.to_vec())
    }
}
