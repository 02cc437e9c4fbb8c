// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    if config.log.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }

    validate_scheduler_config(&config.scheduler)?;

    if let Some(ref lambda) = config.lambda {
        validate_lambda_config(lambda)?;
    }

    Ok(())
}

fn validate_scheduler_config(config: &SchedulerConfig) -> Result<()> {
    if config.schedule.trim().is_empty() {
        bail!("scheduler.schedule must not be empty");
    }

    if config.retention_period <= 0 {
        bail!("scheduler.retention_period must be greater than 0");
    }

    if let Some(ref role_arn) = config.role_arn {
        if role_arn.trim().is_empty() {
            bail!("scheduler.role_arn must not be empty when set");
        }
    }

    Ok(())
}

fn validate_lambda_config(config: &LambdaConfig) -> Result<()> {
    // Same wording the deployment has always used for these variables
    if config.role_arn.trim().is_empty() {
        bail!("Environment variable ROLE_ARN is not set.");
    }
    if config.schedule.trim().is_empty() {
        bail!("Environment variable SCHED is not set.");
    }
    let retention = match config.retention_period {
        Some(days) => days,
        None => bail!("Environment variable RETENTION_PERIOD is not set."),
    };
    if config.destination_region.trim().is_empty() {
        bail!("Environment variable DEST_REGION is not set.");
    }

    if retention <= 0 {
        bail!("RETENTION_PERIOD must be greater than 0");
    }

    if config.max_attempts == 0 {
        bail!("lambda.max_attempts must be greater than 0");
    }

    Ok(())
}
