mod support;

use awskeeper_core::reconcile::{handle_event, wait_until_available, ProvisionOutcome};
use awskeeper_core::{ProvisioningConfig, ReconcileReport, RetryPolicy};
use serde_json::{json, Value};
use std::time::Duration;
use support::{Call, FakeWarehouse};

fn config() -> ProvisioningConfig {
    ProvisioningConfig {
        role_arn: "arn:aws:iam::123456789012:role/redshift-snapshots".into(),
        schedule: "(0 19 * * ? *)".into(),
        retention_period: 7,
        destination_region: "eu-west-1".into(),
    }
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        interval: Duration::ZERO,
    }
}

fn namespace_event(event_name: &str, namespace: &str) -> Value {
    json!({
        "detail-type": "AWS API Call via CloudTrail",
        "source": "aws.redshift-serverless",
        "detail": {
            "eventName": event_name,
            "responseElements": { "namespace": { "namespaceName": namespace } }
        }
    })
}

#[tokio::test]
async fn sweep_provisions_only_uncovered_namespaces() {
    let warehouse = FakeWarehouse::with_namespaces(
        &["sales", "finance", "ops"],
        &["scheduledsnapshot-sales", "dailysnapshot-ops"],
    );

    let report = handle_event(&warehouse, &config(), fast_policy(3), &json!({}))
        .await
        .unwrap();

    assert_eq!(
        report,
        ReconcileReport::Sweep {
            provisioned: vec!["finance".into(), "ops".into()],
            failed: Vec::new(),
        }
    );
    assert_eq!(
        warehouse.created_actions(),
        vec!["scheduledsnapshot-finance", "scheduledsnapshot-ops"]
    );

    let calls = warehouse.calls();
    match (&calls[0], &calls[1]) {
        (Call::CreateScheduledAction(action), Call::CreateSnapshotCopy(copy)) => {
            assert_eq!(action.description, "");
            assert_eq!(action.retention_period, 7);
            assert_eq!(copy.destination_region, "eu-west-1");
            assert_eq!(copy.namespace_name, "finance");
        }
        other => panic!("unexpected calls {:?}", other),
    }
}

#[tokio::test]
async fn sweep_continues_after_a_failed_namespace() {
    let warehouse =
        FakeWarehouse::with_namespaces(&["finance", "ops"], &[]).failing_create("finance");

    let report = handle_event(&warehouse, &config(), fast_policy(3), &Value::Null)
        .await
        .unwrap();

    let ReconcileReport::Sweep {
        provisioned,
        failed,
    } = report
    else {
        panic!("expected sweep report");
    };
    assert_eq!(provisioned, vec!["ops".to_string()]);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].namespace, "finance");
    assert!(failed[0].reason.contains("role cannot be assumed"));

    // No copy configuration for the namespace whose schedule failed
    let copies = warehouse
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::CreateSnapshotCopy(r) if r.namespace_name == "finance"))
        .count();
    assert_eq!(copies, 0);
}

#[tokio::test]
async fn delete_event_removes_scheduled_action() {
    let warehouse = FakeWarehouse::default();

    let report = handle_event(
        &warehouse,
        &config(),
        fast_policy(3),
        &namespace_event("DeleteNamespace", "Sales"),
    )
    .await
    .unwrap();

    assert_eq!(
        warehouse.calls(),
        vec![Call::DeleteScheduledAction("scheduledsnapshot-sales".into())]
    );
    assert!(matches!(report, ReconcileReport::Deleted { ref namespace, .. } if namespace == "Sales"));
}

#[tokio::test]
async fn create_event_waits_for_available_namespace() {
    let warehouse =
        FakeWarehouse::default().statuses(&["CREATING", "MODIFYING", "AVAILABLE"]);

    let report = handle_event(
        &warehouse,
        &config(),
        fast_policy(5),
        &namespace_event("CreateNamespace", "analytics"),
    )
    .await
    .unwrap();

    assert_eq!(warehouse.get_namespace_calls(), 3);
    assert_eq!(
        report,
        ReconcileReport::Created {
            namespace: "analytics".into(),
            outcome: ProvisionOutcome::Provisioned,
        }
    );
    assert_eq!(
        warehouse.created_actions(),
        vec!["scheduledsnapshot-analytics"]
    );
}

#[tokio::test]
async fn create_event_gives_up_after_max_attempts() {
    let warehouse = FakeWarehouse::default().statuses(&["CREATING"]);

    let report = handle_event(
        &warehouse,
        &config(),
        fast_policy(4),
        &namespace_event("CreateNamespace", "analytics"),
    )
    .await
    .unwrap();

    assert_eq!(warehouse.get_namespace_calls(), 4);
    assert!(warehouse.created_actions().is_empty());
    assert_eq!(
        report,
        ReconcileReport::Created {
            namespace: "analytics".into(),
            outcome: ProvisionOutcome::NotAvailable { attempts: 4 },
        }
    );
}

#[tokio::test]
async fn create_event_reports_provisioning_failure() {
    let warehouse = FakeWarehouse::default()
        .statuses(&["AVAILABLE"])
        .failing_create("analytics");

    let report = handle_event(
        &warehouse,
        &config(),
        fast_policy(2),
        &namespace_event("CreateNamespace", "analytics"),
    )
    .await
    .unwrap();

    assert!(matches!(
        report,
        ReconcileReport::Created {
            outcome: ProvisionOutcome::Failed { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn unrelated_events_are_ignored() {
    let warehouse = FakeWarehouse::default();

    let report = handle_event(
        &warehouse,
        &config(),
        fast_policy(2),
        &namespace_event("UpdateWorkgroup", "analytics"),
    )
    .await
    .unwrap();

    assert!(warehouse.calls().is_empty());
    assert_eq!(
        report,
        ReconcileReport::Ignored {
            event_name: "UpdateWorkgroup".into()
        }
    );
}

#[tokio::test]
async fn wait_returns_immediately_when_available() {
    let warehouse = FakeWarehouse::default().statuses(&["AVAILABLE"]);

    let namespace = wait_until_available(&warehouse, "sales", fast_policy(20))
        .await
        .unwrap();

    assert!(namespace.is_some_and(|ns| ns.is_available()));
    assert_eq!(warehouse.get_namespace_calls(), 1);
}
