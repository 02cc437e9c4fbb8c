// S3 bucket lifecycle client

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::types::{
    self as s3, BucketLifecycleConfiguration, ExpirationStatus, LifecycleRuleFilter,
    TransitionStorageClass,
};
use aws_sdk_s3::Client;
use awskeeper_core::error::NO_SUCH_LIFECYCLE_CONFIGURATION;
use awskeeper_core::{
    LifecycleRule, NoncurrentVersionTransition, ObjectStore, RuleStatus, ServiceError, Transition,
};
use tracing::debug;

use crate::service_error;

const LIST_BUCKETS: &str = "ListBuckets";
const GET_LIFECYCLE: &str = "GetBucketLifecycleConfiguration";
const PUT_LIFECYCLE: &str = "PutBucketLifecycleConfiguration";

#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_buckets(&self) -> Result<Vec<String>, ServiceError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| service_error(LIST_BUCKETS, &e))?;

        let buckets: Vec<String> = output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect();
        debug!(count = buckets.len(), "Listed buckets");
        Ok(buckets)
    }

    async fn lifecycle_rules(
        &self,
        bucket: &str,
    ) -> Result<Option<Vec<LifecycleRule>>, ServiceError> {
        let rules = self
            .client
            .get_bucket_lifecycle_configuration()
            .bucket(bucket)
            .send()
            .await
            .map(|output| output.rules().iter().map(rule_from_sdk).collect())
            .map_err(|e| service_error(GET_LIFECYCLE, &e));
        missing_configuration_as_none(rules)
    }

    async fn put_lifecycle_rules(
        &self,
        bucket: &str,
        rules: &[LifecycleRule],
    ) -> Result<(), ServiceError> {
        let sdk_rules = rules
            .iter()
            .map(rule_to_sdk)
            .collect::<Result<Vec<_>, _>>()?;
        let configuration = BucketLifecycleConfiguration::builder()
            .set_rules(Some(sdk_rules))
            .build()
            .map_err(|e| ServiceError::new(PUT_LIFECYCLE, e.to_string()))?;

        self.client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(|e| service_error(PUT_LIFECYCLE, &e))?;
        debug!(bucket = %bucket, rules = rules.len(), "Put lifecycle configuration");
        Ok(())
    }
}

/// A bucket without a lifecycle configuration has no rules rather than an error
fn missing_configuration_as_none(
    rules: Result<Vec<LifecycleRule>, ServiceError>,
) -> Result<Option<Vec<LifecycleRule>>, ServiceError> {
    match rules {
        Ok(rules) => Ok(Some(rules)),
        Err(err) if err.is_code(NO_SUCH_LIFECYCLE_CONFIGURATION) => Ok(None),
        Err(err) => Err(err),
    }
}

fn rule_from_sdk(rule: &s3::LifecycleRule) -> LifecycleRule {
    let status = match rule.status() {
        ExpirationStatus::Enabled => RuleStatus::Enabled,
        _ => RuleStatus::Disabled,
    };
    #[allow(deprecated)]
    let prefix = rule
        .filter()
        .and_then(|f| f.prefix())
        .or(rule.prefix())
        .map(str::to_string);

    LifecycleRule {
        id: rule.id().map(str::to_string),
        status,
        prefix,
        transitions: rule
            .transitions()
            .iter()
            .map(|t| Transition {
                days: t.days(),
                storage_class: t
                    .storage_class()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect(),
        noncurrent_version_transitions: rule
            .noncurrent_version_transitions()
            .iter()
            .map(|t| NoncurrentVersionTransition {
                noncurrent_days: t.noncurrent_days(),
                storage_class: t
                    .storage_class()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect(),
    }
}

fn rule_to_sdk(rule: &LifecycleRule) -> Result<s3::LifecycleRule, ServiceError> {
    let status = match rule.status {
        RuleStatus::Enabled => ExpirationStatus::Enabled,
        RuleStatus::Disabled => ExpirationStatus::Disabled,
    };
    // An empty prefix filter applies the rule to every object in the bucket
    let filter = LifecycleRuleFilter::builder()
        .prefix(rule.prefix.clone().unwrap_or_default())
        .build();

    let transitions = rule
        .transitions
        .iter()
        .map(|t| {
            s3::Transition::builder()
                .set_days(t.days)
                .storage_class(TransitionStorageClass::from(t.storage_class.as_str()))
                .build()
        })
        .collect::<Vec<_>>();
    let noncurrent = rule
        .noncurrent_version_transitions
        .iter()
        .map(|t| {
            s3::NoncurrentVersionTransition::builder()
                .set_noncurrent_days(t.noncurrent_days)
                .storage_class(TransitionStorageClass::from(t.storage_class.as_str()))
                .build()
        })
        .collect::<Vec<_>>();

    s3::LifecycleRule::builder()
        .set_id(rule.id.clone())
        .status(status)
        .filter(filter)
        .set_transitions(Some(transitions))
        .set_noncurrent_version_transitions(Some(noncurrent))
        .build()
        .map_err(|e| ServiceError::new(PUT_LIFECYCLE, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use awskeeper_core::lifecycle::intelligent_tiering_rule;

    #[test]
    fn test_tiering_rule_to_sdk() {
        let rule = rule_to_sdk(&intelligent_tiering_rule()).unwrap();
        assert_eq!(rule.id(), Some("S3_storageClass"));
        assert_eq!(rule.status(), &ExpirationStatus::Enabled);
        assert_eq!(rule.filter().and_then(|f| f.prefix()), Some(""));
        assert_eq!(rule.transitions().len(), 1);
        assert_eq!(rule.transitions()[0].days(), Some(0));
        assert_eq!(
            rule.transitions()[0].storage_class(),
            Some(&TransitionStorageClass::IntelligentTiering)
        );
        assert_eq!(
            rule.noncurrent_version_transitions()[0].noncurrent_days(),
            Some(0)
        );
    }

    #[test]
    fn test_rule_from_sdk() {
        let sdk_rule = s3::LifecycleRule::builder()
            .id("archive")
            .status(ExpirationStatus::Disabled)
            .filter(LifecycleRuleFilter::builder().prefix("logs/").build())
            .transitions(
                s3::Transition::builder()
                    .days(30)
                    .storage_class(TransitionStorageClass::Glacier)
                    .build(),
            )
            .build()
            .unwrap();

        let rule = rule_from_sdk(&sdk_rule);
        assert!(rule.has_id("archive"));
        assert_eq!(rule.status, RuleStatus::Disabled);
        assert_eq!(rule.prefix.as_deref(), Some("logs/"));
        assert_eq!(rule.transitions[0].days, Some(30));
        assert_eq!(rule.transitions[0].storage_class, "GLACIER");
        assert!(rule.noncurrent_version_transitions.is_empty());
    }

    #[test]
    fn test_missing_configuration_is_no_rules() {
        let missing = ServiceError::with_code(
            GET_LIFECYCLE,
            NO_SUCH_LIFECYCLE_CONFIGURATION,
            "The lifecycle configuration does not exist",
        );
        assert_eq!(missing_configuration_as_none(Err(missing)).unwrap(), None);

        let denied = ServiceError::with_code(GET_LIFECYCLE, "AccessDenied", "Access Denied");
        let err = missing_configuration_as_none(Err(denied)).unwrap_err();
        assert!(err.is_code("AccessDenied"));

        let rules = missing_configuration_as_none(Ok(vec![intelligent_tiering_rule()])).unwrap();
        assert_eq!(rules.map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_round_trip_keeps_intelligent_tiering() {
        let tiering = intelligent_tiering_rule();
        let converted = rule_from_sdk(&rule_to_sdk(&tiering).unwrap());
        assert_eq!(converted.id, tiering.id);
        assert_eq!(converted.transitions, tiering.transitions);
        assert_eq!(
            converted.noncurrent_version_transitions,
            tiering.noncurrent_version_transitions
        );
    }
}
