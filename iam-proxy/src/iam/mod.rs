use crate::common::Tag;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

mod aws;
#[cfg(test)]
pub mod fake;

pub use aws::{log_caller_identity, AwsIamControlPlane};

/// An IAM user as returned by CreateUser, GetUser and ListUsers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamUser {
    pub user_name: String,
    pub arn: String,
    pub user_id: String,
    pub created: DateTime<Utc>,
}

/// Access key listing entry; never carries the secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyMetadata {
    pub access_key_id: String,
    pub status: String,
    pub created: Option<DateTime<Utc>>,
}

/// Freshly created access key. The secret is only ever available here.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccessKey {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for NewAccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccessKey")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPolicy {
    pub policy_name: String,
    pub policy_arn: String,
}

/// Errors surfaced by the IAM control plane adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IamError {
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("{operation} returned an incomplete response: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },

    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },
}

impl IamError {
    pub fn service(
        operation: &'static str,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service {
            operation,
            code,
            message: message.into(),
        }
    }

    pub fn malformed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            detail: detail.into(),
        }
    }

    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

pub type IamResult<T> = Result<T, IamError>;

/// The subset of the IAM control plane the proxy drives.
///
/// Every method maps onto exactly one IAM API action (listings follow
/// pagination markers until the full result set is collected).
#[async_trait]
pub trait IamControlPlane: Send + Sync {
    /// CreateUser
    async fn create_user(&self, user_name: &str, tags: &[Tag]) -> IamResult<IamUser>;

    /// AttachUserPolicy
    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> IamResult<()>;

    /// CreateAccessKey
    async fn create_access_key(&self, user_name: &str) -> IamResult<NewAccessKey>;

    /// ListAccessKeys
    async fn list_access_keys(&self, user_name: &str) -> IamResult<Vec<AccessKeyMetadata>>;

    /// DeleteAccessKey
    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> IamResult<()>;

    /// ListAttachedUserPolicies
    async fn list_attached_user_policies(&self, user_name: &str)
        -> IamResult<Vec<AttachedPolicy>>;

    /// DetachUserPolicy
    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> IamResult<()>;

    /// DeleteUser
    async fn delete_user(&self, user_name: &str) -> IamResult<()>;

    /// ListUsers
    async fn list_users(&self) -> IamResult<Vec<IamUser>>;

    /// GetUser
    async fn get_user(&self, user_name: &str) -> IamResult<IamUser>;
}

/// Render a timestamp the way callers expect it: RFC 3339 with a numeric
/// offset, e.g. `2024-01-02T03:04:05+00:00`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
