use super::{
    AccessKeyMetadata, AttachedPolicy, IamControlPlane, IamError, IamResult, IamUser, NewAccessKey,
};
use crate::common::Tag;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::primitives::DateTime as AwsDateTime;
use aws_sdk_iam::types;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_sts::Client as StsClient;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// `IamControlPlane` backed by the AWS SDK
#[derive(Clone)]
pub struct AwsIamControlPlane {
    client: IamClient,
}

impl AwsIamControlPlane {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(IamClient::new(config))
    }
}

/// Log the identity the proxy will act as. Failure only warns: the first IAM
/// call will surface a credentials problem to the caller anyway.
pub async fn log_caller_identity(config: &SdkConfig) {
    let sts_client = StsClient::new(config);
    match sts_client.get_caller_identity().send().await {
        Ok(identity) => match identity.arn() {
            Some(arn) => info!("Acting as IAM identity: {}", arn),
            None => warn!("Could not get caller identity ARN"),
        },
        Err(e) => warn!(
            "Failed to resolve caller identity: {}",
            DisplayErrorContext(&e)
        ),
    }
}

fn service_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> IamError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    IamError::service(operation, code, message)
}

fn to_utc(operation: &'static str, timestamp: &AwsDateTime) -> IamResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
        .ok_or_else(|| IamError::malformed(operation, format!("timestamp out of range: {}", timestamp)))
}

fn to_iam_user(operation: &'static str, user: &types::User) -> IamResult<IamUser> {
    Ok(IamUser {
        user_name: user.user_name().to_string(),
        arn: user.arn().to_string(),
        user_id: user.user_id().to_string(),
        created: to_utc(operation, user.create_date())?,
    })
}

fn to_access_key_metadata(
    operation: &'static str,
    key: &types::AccessKeyMetadata,
) -> IamResult<AccessKeyMetadata> {
    let access_key_id = key
        .access_key_id()
        .ok_or_else(|| IamError::malformed(operation, "access key id missing"))?;
    Ok(AccessKeyMetadata {
        access_key_id: access_key_id.to_string(),
        status: key
            .status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        created: key
            .create_date()
            .map(|d| to_utc(operation, d))
            .transpose()?,
    })
}

fn to_attached_policy(
    operation: &'static str,
    policy: &types::AttachedPolicy,
) -> IamResult<AttachedPolicy> {
    let policy_arn = policy
        .policy_arn()
        .ok_or_else(|| IamError::malformed(operation, "policy arn missing"))?;
    Ok(AttachedPolicy {
        policy_name: policy.policy_name().unwrap_or_default().to_string(),
        policy_arn: policy_arn.to_string(),
    })
}

fn to_sdk_tags(tags: &[Tag]) -> IamResult<Vec<types::Tag>> {
    tags.iter()
        .map(|tag| {
            types::Tag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build()
                .map_err(|e| IamError::invalid_input("tag", e.to_string()))
        })
        .collect()
}

#[async_trait]
impl IamControlPlane for AwsIamControlPlane {
    async fn create_user(&self, user_name: &str, tags: &[Tag]) -> IamResult<IamUser> {
        const OP: &str = "CreateUser";
        let tags = to_sdk_tags(tags)?;
        let output = self
            .client
            .create_user()
            .user_name(user_name)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| service_error(OP, e))?;

        let user = output
            .user()
            .ok_or_else(|| IamError::malformed(OP, "user missing from response"))?;
        to_iam_user(OP, user)
    }

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> IamResult<()> {
        self.client
            .attach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| service_error("AttachUserPolicy", e))?;
        Ok(())
    }

    async fn create_access_key(&self, user_name: &str) -> IamResult<NewAccessKey> {
        const OP: &str = "CreateAccessKey";
        let output = self
            .client
            .create_access_key()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| service_error(OP, e))?;

        let key = output
            .access_key()
            .ok_or_else(|| IamError::malformed(OP, "access key missing from response"))?;
        Ok(NewAccessKey {
            access_key_id: key.access_key_id().to_string(),
            secret_access_key: key.secret_access_key().to_string(),
        })
    }

    async fn list_access_keys(&self, user_name: &str) -> IamResult<Vec<AccessKeyMetadata>> {
        const OP: &str = "ListAccessKeys";
        let keys = self
            .client
            .list_access_keys()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error(OP, e))?;

        debug!("{} returned {} keys for {}", OP, keys.len(), user_name);
        keys.iter()
            .map(|key| to_access_key_metadata(OP, key))
            .collect()
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> IamResult<()> {
        self.client
            .delete_access_key()
            .user_name(user_name)
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(|e| service_error("DeleteAccessKey", e))?;
        Ok(())
    }

    async fn list_attached_user_policies(
        &self,
        user_name: &str,
    ) -> IamResult<Vec<AttachedPolicy>> {
        const OP: &str = "ListAttachedUserPolicies";
        let policies = self
            .client
            .list_attached_user_policies()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error(OP, e))?;

        policies
            .iter()
            .map(|policy| to_attached_policy(OP, policy))
            .collect()
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> IamResult<()> {
        self.client
            .detach_user_policy()
            .user_name(user_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| service_error("DetachUserPolicy", e))?;
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> IamResult<()> {
        self.client
            .delete_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| service_error("DeleteUser", e))?;
        Ok(())
    }

    async fn list_users(&self) -> IamResult<Vec<IamUser>> {
        const OP: &str = "ListUsers";
        let users = self
            .client
            .list_users()
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| service_error(OP, e))?;

        users.iter().map(|user| to_iam_user(OP, user)).collect()
    }

    async fn get_user(&self, user_name: &str) -> IamResult<IamUser> {
        const OP: &str = "GetUser";
        let output = self
            .client
            .get_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| service_error(OP, e))?;

        let user = output
            .user()
            .ok_or_else(|| IamError::malformed(OP, "user missing from response"))?;
        to_iam_user(OP, user)
    }
}
