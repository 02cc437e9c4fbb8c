//! Namespace event handling: keep every namespace covered by a snapshot
//! schedule and a cross-region snapshot copy configuration.
//!
//! Three entry shapes:
//! - empty event: sweep all namespaces and provision the ones without a schedule
//! - `CreateNamespace`: wait for the namespace to become available, then provision it
//! - `DeleteNamespace`: drop the namespace's scheduled action

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::client::ServerlessWarehouse;
use crate::error::{HousekeepingError, Result};
use crate::model::{NamespaceInfo, ScheduledActionRequest, SnapshotCopyRequest, STATUS_AVAILABLE};
use crate::schedule::{cron_expression, event_action_name, EVENT_ACTION_PREFIX};

pub const CREATE_NAMESPACE: &str = "CreateNamespace";
pub const DELETE_NAMESPACE: &str = "DeleteNamespace";

/// Settings applied to every namespace the handler provisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningConfig {
    pub role_arn: String,
    pub schedule: String,
    pub retention_period: i32,
    pub destination_region: String,
}

impl ProvisioningConfig {
    fn scheduled_action(&self, namespace_name: &str) -> ScheduledActionRequest {
        ScheduledActionRequest {
            action_name: event_action_name(namespace_name),
            namespace_name: namespace_name.to_string(),
            role_arn: self.role_arn.clone(),
            schedule: cron_expression(&self.schedule),
            description: String::new(),
            enabled: true,
            retention_period: self.retention_period,
        }
    }

    fn snapshot_copy(&self, namespace_name: &str) -> SnapshotCopyRequest {
        SnapshotCopyRequest {
            namespace_name: namespace_name.to_string(),
            destination_region: self.destination_region.clone(),
            retention_period: self.retention_period,
        }
    }
}

/// Bounded fixed-interval polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    Sweep,
    Created(String),
    Deleted(String),
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct CloudTrailEvent {
    detail: CloudTrailDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudTrailDetail {
    event_name: String,
    #[serde(default)]
    response_elements: Option<ResponseElements>,
    #[serde(default)]
    request_parameters: Option<NamespaceRef>,
}

#[derive(Debug, Deserialize)]
struct ResponseElements {
    namespace: NamespaceRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceRef {
    namespace_name: String,
}

/// Decide what an incoming event asks for
pub fn parse_event(event: &Value) -> Result<EventAction> {
    match event {
        Value::Null => return Ok(EventAction::Sweep),
        Value::Object(map) if map.is_empty() => return Ok(EventAction::Sweep),
        Value::Object(_) => {}
        other => {
            return Err(HousekeepingError::MalformedEvent(format!(
                "expected an object, got {}",
                other
            )))
        }
    }

    let parsed: CloudTrailEvent = serde_json::from_value(event.clone())
        .map_err(|e| HousekeepingError::MalformedEvent(e.to_string()))?;
    let detail = parsed.detail;

    if detail.event_name != CREATE_NAMESPACE && detail.event_name != DELETE_NAMESPACE {
        return Ok(EventAction::Ignored(detail.event_name));
    }

    let namespace_name = detail
        .response_elements
        .map(|r| r.namespace.namespace_name)
        .or_else(|| detail.request_parameters.map(|p| p.namespace_name))
        .ok_or_else(|| {
            HousekeepingError::MalformedEvent(format!(
                "{} event carries no namespace name",
                detail.event_name
            ))
        })?;

    if detail.event_name == CREATE_NAMESPACE {
        Ok(EventAction::Created(namespace_name))
    } else {
        Ok(EventAction::Deleted(namespace_name))
    }
}

/// Namespaces with no `scheduledsnapshot-<namespace>` action, in input order
pub fn missing_schedules(namespaces: &[String], action_names: &[String]) -> Vec<String> {
    let covered: HashSet<&str> = action_names
        .iter()
        .filter_map(|name| name.strip_prefix(EVENT_ACTION_PREFIX))
        .collect();

    namespaces
        .iter()
        .filter(|ns| !covered.contains(ns.to_lowercase().as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceFailure {
    pub namespace: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Provisioned,
    Failed { reason: String },
    NotAvailable { attempts: u32 },
}

/// What one invocation did, returned to the Lambda caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReconcileReport {
    Sweep {
        provisioned: Vec<String>,
        failed: Vec<NamespaceFailure>,
    },
    Created {
        namespace: String,
        outcome: ProvisionOutcome,
    },
    Deleted {
        namespace: String,
        action_name: String,
    },
    Ignored {
        event_name: String,
    },
}

/// Create the scheduled action, then the snapshot copy configuration
pub async fn provision_namespace(
    warehouse: &dyn ServerlessWarehouse,
    config: &ProvisioningConfig,
    namespace_name: &str,
) -> Result<()> {
    warehouse
        .create_scheduled_action(&config.scheduled_action(namespace_name))
        .await?;
    info!(namespace = %namespace_name, "Scheduled action created for {}", namespace_name);

    warehouse
        .create_snapshot_copy_configuration(&config.snapshot_copy(namespace_name))
        .await?;
    info!(
        namespace = %namespace_name,
        destination_region = %config.destination_region,
        "Snapshot copy configuration created for {}",
        namespace_name
    );
    Ok(())
}

/// Poll until the namespace reports `AVAILABLE`. `Ok(None)` when attempts run out.
pub async fn wait_until_available(
    warehouse: &dyn ServerlessWarehouse,
    namespace_name: &str,
    policy: RetryPolicy,
) -> Result<Option<NamespaceInfo>> {
    for attempt in 1..=policy.max_attempts {
        let namespace = warehouse.get_namespace(namespace_name).await?;
        if namespace.is_available() {
            info!(
                namespace = %namespace_name,
                "Namespace is {}, creating scheduled action...",
                STATUS_AVAILABLE
            );
            return Ok(Some(namespace));
        }

        if attempt < policy.max_attempts {
            info!(
                namespace = %namespace_name,
                "Attempt {}/{}: Namespace is {}, retrying in {} seconds...",
                attempt,
                policy.max_attempts,
                namespace.status_or_unknown(),
                policy.interval.as_secs()
            );
            tokio::time::sleep(policy.interval).await;
        } else {
            info!(
                namespace = %namespace_name,
                "Attempt {}/{}: Namespace is {}",
                attempt,
                policy.max_attempts,
                namespace.status_or_unknown()
            );
        }
    }
    Ok(None)
}

/// Provision every namespace that has no scheduled action yet
pub async fn sweep(
    warehouse: &dyn ServerlessWarehouse,
    config: &ProvisioningConfig,
) -> Result<ReconcileReport> {
    let namespaces = warehouse.list_namespaces().await?;
    let actions = warehouse.list_scheduled_actions().await?;
    let missing = missing_schedules(&namespaces, &actions);
    info!(
        namespaces = namespaces.len(),
        scheduled_actions = actions.len(),
        missing = missing.len(),
        "Reconciling snapshot schedules"
    );

    let mut provisioned = Vec::new();
    let mut failed = Vec::new();
    for namespace in missing {
        match provision_namespace(warehouse, config, &namespace).await {
            Ok(()) => provisioned.push(namespace),
            Err(e) => {
                warn!(namespace = %namespace, error = %e, "Failed for {}: {}", namespace, e);
                failed.push(NamespaceFailure {
                    namespace,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(ReconcileReport::Sweep {
        provisioned,
        failed,
    })
}

/// Entry point for one Lambda invocation
pub async fn handle_event(
    warehouse: &dyn ServerlessWarehouse,
    config: &ProvisioningConfig,
    policy: RetryPolicy,
    event: &Value,
) -> Result<ReconcileReport> {
    match parse_event(event)? {
        EventAction::Sweep => sweep(warehouse, config).await,
        EventAction::Deleted(namespace) => {
            let action_name = event_action_name(&namespace);
            warehouse.delete_scheduled_action(&action_name).await?;
            info!(namespace = %namespace, action = %action_name, "Scheduled action deleted for {}", namespace);
            Ok(ReconcileReport::Deleted {
                namespace,
                action_name,
            })
        }
        EventAction::Created(namespace) => {
            let outcome = match wait_until_available(warehouse, &namespace, policy).await? {
                Some(_) => match provision_namespace(warehouse, config, &namespace).await {
                    Ok(()) => ProvisionOutcome::Provisioned,
                    Err(e) => {
                        warn!(namespace = %namespace, error = %e, "Failed for {}: {}", namespace, e);
                        ProvisionOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                },
                None => {
                    warn!(
                        namespace = %namespace,
                        attempts = policy.max_attempts,
                        "Namespace did not become available within the expected time."
                    );
                    ProvisionOutcome::NotAvailable {
                        attempts: policy.max_attempts,
                    }
                }
            };
            Ok(ReconcileReport::Created { namespace, outcome })
        }
        EventAction::Ignored(event_name) => {
            info!(event_name = %event_name, "Ignoring event");
            Ok(ReconcileReport::Ignored { event_name })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cloudtrail(event_name: &str, namespace: &str) -> Value {
        json!({
            "source": "aws.redshift-serverless",
            "detail-type": "AWS API Call via CloudTrail",
            "detail": {
                "eventName": event_name,
                "responseElements": {
                    "namespace": { "namespaceName": namespace, "status": "MODIFYING" }
                }
            }
        })
    }

    #[test]
    fn test_empty_events_sweep() {
        assert_eq!(parse_event(&Value::Null).unwrap(), EventAction::Sweep);
        assert_eq!(parse_event(&json!({})).unwrap(), EventAction::Sweep);
    }

    #[test]
    fn test_namespace_events() {
        assert_eq!(
            parse_event(&cloudtrail("CreateNamespace", "sales")).unwrap(),
            EventAction::Created("sales".into())
        );
        assert_eq!(
            parse_event(&cloudtrail("DeleteNamespace", "sales")).unwrap(),
            EventAction::Deleted("sales".into())
        );
        assert_eq!(
            parse_event(&cloudtrail("UpdateNamespace", "sales")).unwrap(),
            EventAction::Ignored("UpdateNamespace".into())
        );
    }

    #[test]
    fn test_request_parameters_fallback() {
        let event = json!({
            "detail": {
                "eventName": "DeleteNamespace",
                "requestParameters": { "namespaceName": "finance" }
            }
        });
        assert_eq!(
            parse_event(&event).unwrap(),
            EventAction::Deleted("finance".into())
        );
    }

    #[test]
    fn test_malformed_events() {
        assert!(parse_event(&json!([1, 2])).is_err());
        assert!(parse_event(&json!({ "detail": {} })).is_err());
        let err = parse_event(&json!({ "detail": { "eventName": "CreateNamespace" } }))
            .unwrap_err();
        assert!(err.to_string().contains("no namespace name"));
    }

    #[test]
    fn test_missing_schedules() {
        let namespaces = vec!["sales".to_string(), "Finance".to_string(), "ops".to_string()];
        let actions = vec![
            "scheduledsnapshot-sales".to_string(),
            "scheduledsnapshot-finance".to_string(),
            "dailysnapshot-ops".to_string(),
        ];
        assert_eq!(missing_schedules(&namespaces, &actions), vec!["ops".to_string()]);
        assert_eq!(missing_schedules(&[], &actions), Vec::<String>::new());
    }

    #[test]
    fn test_report_serialization() {
        let report = ReconcileReport::Created {
            namespace: "sales".into(),
            outcome: ProvisionOutcome::NotAvailable { attempts: 20 },
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "event": "created",
                "namespace": "sales",
                "outcome": { "status": "not_available", "attempts": 20 }
            })
        );
    }
}
