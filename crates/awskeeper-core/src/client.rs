// Cloud client traits
//
// Implementations:
// - S3 / Redshift Serverless SDK adapters (awskeeper-aws)
// - In-memory fakes (tests)

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::model::{
    LifecycleRule, NamespaceInfo, RestoreRequest, ScheduledActionInfo, ScheduledActionRequest,
    SnapshotCopyRequest,
};

/// Object storage operations needed for lifecycle housekeeping
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Names of every bucket visible to the caller
    async fn list_buckets(&self) -> Result<Vec<String>, ServiceError>;

    /// Lifecycle rules of a bucket, `None` when it has no lifecycle configuration
    async fn lifecycle_rules(&self, bucket: &str)
        -> Result<Option<Vec<LifecycleRule>>, ServiceError>;

    /// Replace the lifecycle configuration of a bucket
    async fn put_lifecycle_rules(
        &self,
        bucket: &str,
        rules: &[LifecycleRule],
    ) -> Result<(), ServiceError>;
}

/// Redshift Serverless control-plane operations
#[async_trait]
pub trait ServerlessWarehouse: Send + Sync {
    /// Names of all namespaces, across every result page
    async fn list_namespaces(&self) -> Result<Vec<String>, ServiceError>;

    /// Names of all scheduled actions, across every result page
    async fn list_scheduled_actions(&self) -> Result<Vec<String>, ServiceError>;

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceInfo, ServiceError>;

    /// Returns the created action, `None` if the response did not describe one
    async fn create_scheduled_action(
        &self,
        request: &ScheduledActionRequest,
    ) -> Result<Option<ScheduledActionInfo>, ServiceError>;

    /// The update call does not carry `request.namespace_name`
    async fn update_scheduled_action(
        &self,
        request: &ScheduledActionRequest,
    ) -> Result<Option<ScheduledActionInfo>, ServiceError>;

    async fn delete_scheduled_action(&self, action_name: &str) -> Result<(), ServiceError>;

    async fn create_snapshot_copy_configuration(
        &self,
        request: &SnapshotCopyRequest,
    ) -> Result<(), ServiceError>;

    /// Returns the restored namespace, `None` if the response did not describe one
    async fn restore_from_snapshot(
        &self,
        request: &RestoreRequest,
    ) -> Result<Option<NamespaceInfo>, ServiceError>;
}
