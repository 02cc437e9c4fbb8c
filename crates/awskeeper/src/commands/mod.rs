//! Subcommands of the `awskeeper` binary

use anyhow::Result;
use awskeeper_core::HousekeepingError;

pub mod s3;
pub mod snapshot;

pub use s3::S3Command;
pub use snapshot::SnapshotCommand;

/// Print a service failure as a report line; anything else aborts the command
fn report_service_error(err: HousekeepingError) -> Result<bool> {
    match err {
        HousekeepingError::Service(e) => {
            println!("Error: {}", e);
            Ok(false)
        }
        other => Err(other.into()),
    }
}
