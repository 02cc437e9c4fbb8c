// Redshift Serverless control-plane client

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_redshiftserverless::primitives::DateTimeFormat;
use aws_sdk_redshiftserverless::types::{
    CreateSnapshotScheduleActionParameters, Namespace, Schedule, ScheduledActionResponse,
    TargetAction,
};
use aws_sdk_redshiftserverless::Client;
use awskeeper_core::{
    NamespaceInfo, RestoreRequest, ScheduledActionInfo, ScheduledActionRequest,
    ServerlessWarehouse, ServiceError, SnapshotCopyRequest,
};
use tracing::debug;

use crate::pagination::collect_pages;
use crate::service_error;

#[derive(Clone)]
pub struct RedshiftServerless {
    client: Client,
}

impl RedshiftServerless {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServerlessWarehouse for RedshiftServerless {
    async fn list_namespaces(&self) -> Result<Vec<String>, ServiceError> {
        let client = &self.client;
        let names = collect_pages(|token| async move {
            let output = client
                .list_namespaces()
                .set_next_token(token)
                .send()
                .await
                .map_err(|e| service_error("ListNamespaces", &e))?;
            let page: Vec<String> = output
                .namespaces()
                .iter()
                .filter_map(|ns| ns.namespace_name().map(str::to_string))
                .collect();
            Ok::<_, ServiceError>((page, output.next_token().map(str::to_string)))
        })
        .await?;
        debug!(count = names.len(), "Listed namespaces");
        Ok(names)
    }

    async fn list_scheduled_actions(&self) -> Result<Vec<String>, ServiceError> {
        let client = &self.client;
        let names = collect_pages(|token| async move {
            let output = client
                .list_scheduled_actions()
                .set_next_token(token)
                .send()
                .await
                .map_err(|e| service_error("ListScheduledActions", &e))?;
            let page: Vec<String> = output
                .scheduled_actions()
                .iter()
                .filter_map(|a| a.scheduled_action_name().map(str::to_string))
                .collect();
            Ok::<_, ServiceError>((page, output.next_token().map(str::to_string)))
        })
        .await?;
        debug!(count = names.len(), "Listed scheduled actions");
        Ok(names)
    }

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceInfo, ServiceError> {
        let output = self
            .client
            .get_namespace()
            .namespace_name(namespace_name)
            .send()
            .await
            .map_err(|e| service_error("GetNamespace", &e))?;

        // A response without a namespace body reads as a namespace of unknown status
        Ok(output
            .namespace()
            .map(namespace_info)
            .unwrap_or_else(|| NamespaceInfo {
                name: namespace_name.to_string(),
                db_name: None,
                iam_roles: Vec::new(),
                status: None,
            }))
    }

    async fn create_scheduled_action(
        &self,
        request: &ScheduledActionRequest,
    ) -> Result<Option<ScheduledActionInfo>, ServiceError> {
        const OPERATION: &str = "CreateScheduledAction";
        let output = self
            .client
            .create_scheduled_action()
            .scheduled_action_name(&request.action_name)
            .namespace_name(&request.namespace_name)
            .role_arn(&request.role_arn)
            .schedule(Schedule::Cron(request.schedule.clone()))
            .target_action(snapshot_target(OPERATION, request)?)
            .scheduled_action_description(&request.description)
            .enabled(request.enabled)
            .send()
            .await
            .map_err(|e| service_error(OPERATION, &e))?;

        Ok(output
            .scheduled_action()
            .map(|a| scheduled_action_info(a, request)))
    }

    async fn update_scheduled_action(
        &self,
        request: &ScheduledActionRequest,
    ) -> Result<Option<ScheduledActionInfo>, ServiceError> {
        const OPERATION: &str = "UpdateScheduledAction";
        let output = self
            .client
            .update_scheduled_action()
            .scheduled_action_name(&request.action_name)
            .role_arn(&request.role_arn)
            .schedule(Schedule::Cron(request.schedule.clone()))
            .target_action(snapshot_target(OPERATION, request)?)
            .scheduled_action_description(&request.description)
            .enabled(request.enabled)
            .send()
            .await
            .map_err(|e| service_error(OPERATION, &e))?;

        Ok(output
            .scheduled_action()
            .map(|a| scheduled_action_info(a, request)))
    }

    async fn delete_scheduled_action(&self, action_name: &str) -> Result<(), ServiceError> {
        self.client
            .delete_scheduled_action()
            .scheduled_action_name(action_name)
            .send()
            .await
            .map_err(|e| service_error("DeleteScheduledAction", &e))?;
        Ok(())
    }

    async fn create_snapshot_copy_configuration(
        &self,
        request: &SnapshotCopyRequest,
    ) -> Result<(), ServiceError> {
        self.client
            .create_snapshot_copy_configuration()
            .namespace_name(&request.namespace_name)
            .destination_region(&request.destination_region)
            .snapshot_retention_period(request.retention_period)
            .send()
            .await
            .map_err(|e| service_error("CreateSnapshotCopyConfiguration", &e))?;
        Ok(())
    }

    async fn restore_from_snapshot(
        &self,
        request: &RestoreRequest,
    ) -> Result<Option<NamespaceInfo>, ServiceError> {
        let output = self
            .client
            .restore_from_snapshot()
            .namespace_name(&request.namespace_name)
            .workgroup_name(&request.workgroup_name)
            .snapshot_name(&request.snapshot_name)
            .send()
            .await
            .map_err(|e| service_error("RestoreFromSnapshot", &e))?;

        Ok(output.namespace().map(namespace_info))
    }
}

/// Snapshot `namespace_name`, prefixing snapshots with the namespace name
fn snapshot_target(
    operation: &'static str,
    request: &ScheduledActionRequest,
) -> Result<TargetAction, ServiceError> {
    let params = CreateSnapshotScheduleActionParameters::builder()
        .namespace_name(&request.namespace_name)
        .snapshot_name_prefix(&request.namespace_name)
        .retention_period(request.retention_period)
        .build()
        .map_err(|e| ServiceError::new(operation, e.to_string()))?;
    Ok(TargetAction::CreateSnapshot(params))
}

fn namespace_info(namespace: &Namespace) -> NamespaceInfo {
    NamespaceInfo {
        name: namespace.namespace_name().unwrap_or_default().to_string(),
        db_name: namespace.db_name().map(str::to_string),
        iam_roles: namespace.iam_roles().to_vec(),
        status: namespace.status().map(|s| s.as_str().to_string()),
    }
}

/// Fields the response leaves out fall back to the request
fn scheduled_action_info(
    action: &ScheduledActionResponse,
    request: &ScheduledActionRequest,
) -> ScheduledActionInfo {
    ScheduledActionInfo {
        namespace_name: action
            .namespace_name()
            .unwrap_or(&request.namespace_name)
            .to_string(),
        action_name: action
            .scheduled_action_name()
            .unwrap_or(&request.action_name)
            .to_string(),
        next_invocations: action
            .next_invocations()
            .iter()
            .map(|dt| {
                dt.fmt(DateTimeFormat::DateTime)
                    .unwrap_or_else(|_| dt.to_string())
            })
            .collect(),
        state: action.state().map(|s| s.as_str().to_string()),
    }
}
