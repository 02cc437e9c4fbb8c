// awskeeper-config - Unified configuration for the CLI and the Lambda handler
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from --config or AWSKEEPER_CONFIG
// 3. Config file contents from AWSKEEPER_CONFIG_CONTENT
// 4. Default config file location (./awskeeper.toml)
// 5. Platform-specific defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod env_overrides;
mod platform;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, MapEnvSource, StdEnvSource, ENV_PREFIX};
pub use platform::Platform;

/// Main runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda: Option<LambdaConfig>,

    /// Config file or variable the file settings were read from
    #[serde(skip)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

/// Credential and endpoint selection for the AWS clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Named profile from ~/.aws/config (SSO profiles included)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// S3 lifecycle housekeeping settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Rule ID checked by `verify-rule`
    #[serde(default = "default_rule_id")]
    pub rule_id: String,
    /// Buckets to operate on; empty means every bucket in the account
    #[serde(default)]
    pub buckets: Vec<String>,
}

fn default_rule_id() -> String {
    "S3_storageClass".to_string()
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            rule_id: default_rule_id(),
            buckets: Vec::new(),
        }
    }
}

/// Defaults for snapshot schedules created from the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_retention_period")]
    pub retention_period: i32,
    #[serde(default)]
    pub description: String,
}

fn default_schedule() -> String {
    "0 19 * * ? *".to_string()
}

fn default_retention_period() -> i32 {
    7
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            role_arn: None,
            schedule: default_schedule(),
            retention_period: default_retention_period(),
            description: String::new(),
        }
    }
}

/// Namespace event handler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaConfig {
    #[serde(default)]
    pub role_arn: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<i32>,
    #[serde(default)]
    pub destination_region: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

fn default_max_attempts() -> u32 {
    20
}

fn default_retry_interval_secs() -> u64 {
    30
}

/// Lambda functions time out after 15 minutes
pub const LAMBDA_TIMEOUT_SECS: u64 = 15 * 60;

impl LambdaConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Longest time spent sleeping between namespace status polls
    pub fn polling_budget_secs(&self) -> u64 {
        u64::from(self.max_attempts.saturating_sub(1)).saturating_mul(self.retry_interval_secs)
    }

    pub fn polling_budget_exceeded(&self) -> bool {
        self.polling_budget_secs() > LAMBDA_TIMEOUT_SECS
    }
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            role_arn: String::new(),
            schedule: String::new(),
            retention_period: None,
            destination_region: String::new(),
            max_attempts: default_max_attempts(),
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

/// Config file contents; absent sections leave the current values alone
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ConfigFile {
    pub log: Option<LogConfig>,
    pub aws: Option<AwsConfig>,
    pub lifecycle: Option<LifecycleConfig>,
    pub scheduler: Option<SchedulerConfig>,
    pub lambda: Option<LambdaConfig>,
}

impl RuntimeConfig {
    pub fn from_platform_defaults(platform: Platform) -> Self {
        match platform {
            Platform::Cli => Self {
                log: LogConfig::default(),
                aws: AwsConfig::default(),
                lifecycle: LifecycleConfig::default(),
                scheduler: SchedulerConfig::default(),
                lambda: None,
                source: None,
            },
            Platform::Lambda => Self {
                log: LogConfig {
                    level: default_log_level(),
                    format: LogFormat::Json,
                },
                aws: AwsConfig::default(),
                lifecycle: LifecycleConfig::default(),
                scheduler: SchedulerConfig::default(),
                lambda: Some(LambdaConfig::default()),
                source: None,
            },
        }
    }

    pub(crate) fn merge(&mut self, file: ConfigFile) {
        if let Some(log) = file.log {
            self.log = log;
        }
        if let Some(aws) = file.aws {
            self.aws = aws;
        }
        if let Some(lifecycle) = file.lifecycle {
            self.lifecycle = lifecycle;
        }
        if let Some(scheduler) = file.scheduler {
            self.scheduler = scheduler;
        }
        // The [lambda] section only applies where the handler runs
        if let (Some(current), Some(lambda)) = (self.lambda.as_mut(), file.lambda) {
            *current = lambda;
        }
    }

    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config(Platform::detect(), None, &StdEnvSource)
    }

    /// Load configuration for a specific platform (useful for testing)
    pub fn load_for_platform(platform: Platform) -> Result<Self> {
        sources::load_config(platform, None, &StdEnvSource)
    }

    /// Load from an explicit file path (CLI --config flag); the file must exist
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_config(Platform::detect(), Some(path.as_ref()), &StdEnvSource)
    }

    /// Load with an explicit platform, file and environment
    pub fn load_with<E: EnvSource>(
        platform: Platform,
        path: Option<&Path>,
        env: &E,
    ) -> Result<Self> {
        sources::load_config(platform, path, env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
