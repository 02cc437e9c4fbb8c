//! Account housekeeping operations for S3 bucket lifecycle rules and
//! Redshift Serverless snapshot schedules.
//!
//! Operations talk to the cloud only through the [`ObjectStore`] and
//! [`ServerlessWarehouse`] traits; `awskeeper-aws` provides the SDK-backed
//! implementations.

pub mod client;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod reconcile;
pub mod restore;
pub mod schedule;

pub use client::{ObjectStore, ServerlessWarehouse};
pub use error::{HousekeepingError, Result, ServiceError};
pub use lifecycle::{BucketReport, LifecycleStatus, DEFAULT_RULE_ID};
pub use model::{
    LifecycleRule, NamespaceInfo, NoncurrentVersionTransition, RestoreRequest, RuleStatus,
    ScheduledActionInfo, ScheduledActionRequest, SnapshotCopyRequest, Transition,
};
pub use reconcile::{ProvisioningConfig, ReconcileReport, RetryPolicy};
pub use restore::RestoreReport;
pub use schedule::{DeleteReport, ScheduleReport, SnapshotSchedule};
