use crate::{LambdaConfig, LogFormat, RuntimeConfig};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

pub const ENV_PREFIX: &str = "AWSKEEPER_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    /// Get an environment variable with the AWSKEEPER_ prefix prepended
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the AWSKEEPER_ prefix
    /// Used for the Lambda's deployment variables (ROLE_ARN, SCHED, ...)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Process environment
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, keyed by their full names
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource(pub HashMap<String, String>);

impl MapEnvSource {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(&format!("{}{}", ENV_PREFIX, key)).cloned()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format.parse::<LogFormat>()?;
    }

    // AWS client selection
    if let Some(profile) = get_env_string(env, "PROFILE") {
        config.aws.profile = Some(profile);
    }
    if let Some(region) = get_env_string(env, "REGION") {
        config.aws.region = Some(region);
    }

    // Lifecycle
    if let Some(rule_id) = get_env_string(env, "RULE_ID") {
        config.lifecycle.rule_id = rule_id;
    }
    if let Some(buckets) = get_env_string(env, "BUCKETS") {
        config.lifecycle.buckets = buckets
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();
    }

    // Scheduler
    if let Some(role_arn) = get_env_string(env, "ROLE_ARN") {
        config.scheduler.role_arn = Some(role_arn);
    }
    if let Some(schedule) = get_env_string(env, "SCHEDULE") {
        config.scheduler.schedule = schedule;
    }
    if let Some(days) = parse_env_i32(get_env_string(env, "RETENTION_PERIOD"), "AWSKEEPER_RETENTION_PERIOD")? {
        config.scheduler.retention_period = days;
    }

    // Lambda deployment variables, only meaningful on the Lambda platform
    if let Some(lambda) = config.lambda.as_mut() {
        apply_lambda_overrides(lambda, env)?;
    }

    Ok(())
}

fn apply_lambda_overrides<E: EnvSource>(lambda: &mut LambdaConfig, env: &E) -> Result<()> {
    if let Some(role_arn) = get_raw_env_string(env, "ROLE_ARN") {
        lambda.role_arn = role_arn;
    }
    if let Some(schedule) = get_raw_env_string(env, "SCHED") {
        lambda.schedule = schedule;
    }
    if let Some(days) = parse_env_i32(get_raw_env_string(env, "RETENTION_PERIOD"), "RETENTION_PERIOD")? {
        lambda.retention_period = Some(days);
    }
    if let Some(region) = get_raw_env_string(env, "DEST_REGION") {
        lambda.destination_region = region;
    }
    if let Some(val) = get_env_string(env, "MAX_ATTEMPTS") {
        lambda.max_attempts = val
            .parse::<u32>()
            .map_err(|e| anyhow!("Invalid AWSKEEPER_MAX_ATTEMPTS value '{}': {}", val, e))?;
    }
    if let Some(val) = get_env_string(env, "RETRY_INTERVAL_SECS") {
        lambda.retry_interval_secs = val.parse::<u64>().map_err(|e| {
            anyhow!("Invalid AWSKEEPER_RETRY_INTERVAL_SECS value '{}': {}", val, e)
        })?;
    }
    Ok(())
}

/// Empty values count as unset
fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty())
}

fn get_raw_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get_raw(key).filter(|v| !v.trim().is_empty())
}

fn parse_env_i32(value: Option<String>, name: &str) -> Result<Option<i32>> {
    match value {
        Some(val) => val
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid {} value '{}': {}", name, val, e)),
        None => Ok(None),
    }
}
