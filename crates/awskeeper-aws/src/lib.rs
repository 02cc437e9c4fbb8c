// awskeeper-aws - SDK-backed clients for the housekeeping operations
//
// Credentials resolve through the standard AWS provider chain, so a named
// SSO profile works once `aws sso login --profile <name>` has been run.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use awskeeper_core::ServiceError;
use tracing::debug;

mod pagination;
mod redshift;
mod s3;

pub use redshift::RedshiftServerless;
pub use s3::S3Store;

/// Load shared SDK configuration for an optional profile and region.
pub async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let config = loader.load().await;
    debug!(
        profile = profile.unwrap_or("default"),
        region = config.region().map(|r| r.as_ref()).unwrap_or("unset"),
        "Loaded AWS SDK configuration"
    );
    config
}

/// Normalise an SDK failure into the code/message shape the operations branch on
pub(crate) fn service_error<E>(operation: &'static str, err: &E) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(err).to_string(),
    };
    match err.code() {
        Some(code) => ServiceError::with_code(operation, code, message),
        None => ServiceError::new(operation, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_smithy_types::error::ErrorMetadata;

    #[test]
    fn test_service_error_keeps_code_and_message() {
        let meta = ErrorMetadata::builder()
            .code("NoSuchLifecycleConfiguration")
            .message("The lifecycle configuration does not exist")
            .build();
        let err = service_error("GetBucketLifecycleConfiguration", &meta);
        assert!(err.is_code("NoSuchLifecycleConfiguration"));
        assert_eq!(err.message, "The lifecycle configuration does not exist");
    }

    #[test]
    fn test_service_error_without_metadata() {
        let meta = ErrorMetadata::builder().build();
        let err = service_error("ListBuckets", &meta);
        assert_eq!(err.code, None);
        assert!(!err.message.is_empty());
    }
}
