//! In-memory fakes of the cloud client traits

#![allow(dead_code)]

use async_trait::async_trait;
use awskeeper_core::{
    LifecycleRule, NamespaceInfo, ObjectStore, RestoreRequest, ScheduledActionInfo,
    ScheduledActionRequest, ServerlessWarehouse, ServiceError, SnapshotCopyRequest,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

type RulesResult = Result<Option<Vec<LifecycleRule>>, ServiceError>;

#[derive(Default)]
pub struct FakeObjectStore {
    pub buckets: Vec<String>,
    pub list_error: Option<ServiceError>,
    pub rules: Mutex<HashMap<String, RulesResult>>,
    pub put_errors: HashSet<String>,
    pub puts: Mutex<Vec<(String, Vec<LifecycleRule>)>>,
}

impl FakeObjectStore {
    pub fn with_buckets(buckets: &[&str]) -> Self {
        Self {
            buckets: buckets.iter().map(|b| b.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn rules(self, bucket: &str, result: RulesResult) -> Self {
        self.rules
            .lock()
            .unwrap()
            .insert(bucket.to_string(), result);
        self
    }

    pub fn failing_put(mut self, bucket: &str) -> Self {
        self.put_errors.insert(bucket.to_string());
        self
    }

    pub fn put_buckets(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|(bucket, _)| bucket.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn list_buckets(&self) -> Result<Vec<String>, ServiceError> {
        match &self.list_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.buckets.clone()),
        }
    }

    async fn lifecycle_rules(
        &self,
        bucket: &str,
    ) -> Result<Option<Vec<LifecycleRule>>, ServiceError> {
        self.rules
            .lock()
            .unwrap()
            .get(bucket)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn put_lifecycle_rules(
        &self,
        bucket: &str,
        rules: &[LifecycleRule],
    ) -> Result<(), ServiceError> {
        if self.put_errors.contains(bucket) {
            return Err(ServiceError::with_code(
                "PutBucketLifecycleConfiguration",
                "AccessDenied",
                "Access Denied",
            ));
        }
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), rules.to_vec()));
        Ok(())
    }
}

/// Calls recorded by [`FakeWarehouse`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetNamespace(String),
    CreateScheduledAction(ScheduledActionRequest),
    UpdateScheduledAction(ScheduledActionRequest),
    DeleteScheduledAction(String),
    CreateSnapshotCopy(SnapshotCopyRequest),
    Restore(RestoreRequest),
}

#[derive(Default)]
pub struct FakeWarehouse {
    pub namespaces: Vec<String>,
    pub actions: Vec<String>,
    /// Status returned by successive `get_namespace` calls; the last one repeats
    pub statuses: Mutex<VecDeque<String>>,
    pub failing_creates: HashSet<String>,
    pub delete_error: Option<ServiceError>,
    pub restore_result: Option<Result<Option<NamespaceInfo>, ServiceError>>,
    /// Create/update respond without describing the action
    pub empty_responses: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeWarehouse {
    pub fn with_namespaces(namespaces: &[&str], actions: &[&str]) -> Self {
        Self {
            namespaces: namespaces.iter().map(|n| n.to_string()).collect(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn statuses(self, statuses: &[&str]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_create(mut self, namespace: &str) -> Self {
        self.failing_creates.insert(namespace.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_actions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateScheduledAction(request) => Some(request.action_name),
                _ => None,
            })
            .collect()
    }

    pub fn get_namespace_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::GetNamespace(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn describe(&self, request: &ScheduledActionRequest) -> Option<ScheduledActionInfo> {
        if self.empty_responses {
            return None;
        }
        Some(ScheduledActionInfo {
            namespace_name: request.namespace_name.clone(),
            action_name: request.action_name.clone(),
            next_invocations: vec!["2026-10-15T19:00:00Z".to_string()],
            state: Some("ACTIVE".to_string()),
        })
    }
}

#[async_trait]
impl ServerlessWarehouse for FakeWarehouse {
    async fn list_namespaces(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.namespaces.clone())
    }

    async fn list_scheduled_actions(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.actions.clone())
    }

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceInfo, ServiceError> {
        self.record(Call::GetNamespace(namespace_name.to_string()));
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(NamespaceInfo {
            name: namespace_name.to_string(),
            db_name: Some("dev".to_string()),
            iam_roles: Vec::new(),
            status,
        })
    }

    async fn create_scheduled_action(
        &self,
        request: &ScheduledActionRequest,
    ) -> Result<Option<ScheduledActionInfo>, ServiceError> {
        self.record(Call::CreateScheduledAction(request.clone()));
        if self.failing_creates.contains(&request.namespace_name) {
            return Err(ServiceError::with_code(
                "CreateScheduledAction",
                "ValidationException",
                "role cannot be assumed",
            ));
        }
        Ok(self.describe(request))
    }

    async fn update_scheduled_action(
        &self,
        request: &ScheduledActionRequest,
    ) -> Result<Option<ScheduledActionInfo>, ServiceError> {
        self.record(Call::UpdateScheduledAction(request.clone()));
        Ok(self.describe(request))
    }

    async fn delete_scheduled_action(&self, action_name: &str) -> Result<(), ServiceError> {
        self.record(Call::DeleteScheduledAction(action_name.to_string()));
        match &self.delete_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn create_snapshot_copy_configuration(
        &self,
        request: &SnapshotCopyRequest,
    ) -> Result<(), ServiceError> {
        self.record(Call::CreateSnapshotCopy(request.clone()));
        Ok(())
    }

    async fn restore_from_snapshot(
        &self,
        request: &RestoreRequest,
    ) -> Result<Option<NamespaceInfo>, ServiceError> {
        self.record(Call::Restore(request.clone()));
        self.restore_result.clone().unwrap_or(Ok(None))
    }
}
