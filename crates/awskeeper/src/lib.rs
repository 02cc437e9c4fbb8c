// awskeeper - command-line housekeeping for an AWS account
//
// - s3: list lifecycle rules, add the Intelligent-Tiering rule, verify a rule
// - snapshot: create/update/delete snapshot schedules, restore from a snapshot
//
// Each command prints one report per resource to stdout. The exit status is
// non-zero when any resource reported a failure.

use awskeeper_aws::{load_sdk_config, RedshiftServerless, S3Store};
use awskeeper_config::RuntimeConfig;

pub mod commands;
mod init;

pub use init::init_tracing;

/// Resolved configuration shared by every subcommand
pub struct CommandContext {
    pub config: RuntimeConfig,
}

impl CommandContext {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// A profile passed on the command line wins over the configured one
    fn profile<'a>(&'a self, profile: Option<&'a str>) -> Option<&'a str> {
        profile.or(self.config.aws.profile.as_deref())
    }

    pub async fn object_store(&self, profile: Option<&str>) -> S3Store {
        let sdk_config =
            load_sdk_config(self.profile(profile), self.config.aws.region.as_deref()).await;
        S3Store::new(&sdk_config)
    }

    pub async fn warehouse(&self, profile: Option<&str>) -> RedshiftServerless {
        let sdk_config =
            load_sdk_config(self.profile(profile), self.config.aws.region.as_deref()).await;
        RedshiftServerless::new(&sdk_config)
    }
}
