// AWS Lambda adapter for namespace events
//
// Triggered by EventBridge rules on Redshift Serverless CloudTrail events
// (CreateNamespace, DeleteNamespace) and by a schedule with an empty payload,
// which runs the reconciliation sweep.

use anyhow::Context;
use awskeeper_aws::{load_sdk_config, RedshiftServerless};
use awskeeper_config::{LambdaConfig, LogFormat, Platform, RuntimeConfig};
use awskeeper_core::reconcile::handle_event;
use awskeeper_core::{ProvisioningConfig, RetryPolicy, ServerlessWarehouse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Built once per cold start
#[derive(Clone)]
pub struct LambdaState {
    pub warehouse: Arc<dyn ServerlessWarehouse>,
    pub provisioning: ProvisioningConfig,
    pub policy: RetryPolicy,
}

impl LambdaState {
    pub fn new(warehouse: Arc<dyn ServerlessWarehouse>, config: &LambdaConfig) -> Self {
        Self {
            warehouse,
            provisioning: provisioning_config(config),
            policy: RetryPolicy {
                max_attempts: config.max_attempts,
                interval: config.retry_interval(),
            },
        }
    }
}

/// Validation guarantees `retention_period` is set
fn provisioning_config(config: &LambdaConfig) -> ProvisioningConfig {
    ProvisioningConfig {
        role_arn: config.role_arn.clone(),
        schedule: config.schedule.clone(),
        retention_period: config.retention_period.unwrap_or_default(),
        destination_region: config.destination_region.clone(),
    }
}

/// Handle one invocation and return the report as JSON
pub async fn handle_request(
    event: LambdaEvent<Value>,
    state: Arc<LambdaState>,
) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "Handling namespace event");

    let report = handle_event(
        state.warehouse.as_ref(),
        &state.provisioning,
        state.policy,
        &payload,
    )
    .await
    .map_err(|e| {
        error!(request_id = %context.request_id, error = %e, "Namespace event failed");
        Error::from(e)
    })?;

    Ok(serde_json::to_value(&report)?)
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    let config = RuntimeConfig::load_for_platform(Platform::Lambda)?;
    init_tracing(&config);
    debug!(
        source = config.source.as_deref().unwrap_or("defaults"),
        "Loaded configuration"
    );

    let lambda_config = config
        .lambda
        .clone()
        .context("lambda configuration missing")?;
    warn_on_polling_budget(&lambda_config);

    let sdk_config =
        load_sdk_config(config.aws.profile.as_deref(), config.aws.region.as_deref()).await;
    let warehouse: Arc<dyn ServerlessWarehouse> = Arc::new(RedshiftServerless::new(&sdk_config));
    let state = Arc::new(LambdaState::new(warehouse, &lambda_config));

    info!(
        destination_region = %state.provisioning.destination_region,
        schedule = %state.provisioning.schedule,
        retention_period = state.provisioning.retention_period,
        max_attempts = state.policy.max_attempts,
        "Namespace event handler ready"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let state = state.clone();
        async move { handle_request(event, state).await }
    }))
    .await
}

/// Returns true when namespace polling can outlast the function timeout
fn warn_on_polling_budget(config: &LambdaConfig) -> bool {
    if !config.polling_budget_exceeded() {
        return false;
    }
    warn!(
        max_attempts = config.max_attempts,
        retry_interval_secs = config.retry_interval_secs,
        polling_budget_secs = config.polling_budget_secs(),
        "Namespace polling may outlast the Lambda timeout"
    );
    true
}

/// JSON to stdout for CloudWatch unless configured otherwise
fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match config.log.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().without_time()),
        ),
        LogFormat::Text => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().without_time()))
        }
    };
}
