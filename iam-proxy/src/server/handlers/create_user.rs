use serde::Serialize;
use tracing::{info, instrument};

use crate::common::{Operation, Tag, S3_FULL_ACCESS_POLICY_ARN};
use crate::iam::{format_timestamp, IamControlPlane};
use crate::server::error::ProxyResult;

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserResult {
    pub operation: Operation,
    pub username: String,
    pub arn: String,
    pub user_id: String,
    pub created_date: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub policy_attached: String,
    pub message: String,
    pub warning: String,
}

/// Create a user, attach S3 full access and issue one access key.
///
/// The three calls are not rolled back: if attaching the policy or creating
/// the key fails, the user is left behind and the error is returned as is.
#[instrument(skip(iam, tags), fields(tag_count = tags.len()))]
pub async fn create_user(
    iam: &dyn IamControlPlane,
    username: &str,
    tags: &[Tag],
) -> ProxyResult<CreateUserResult> {
    info!("Creating user: {}", username);
    let user = iam.create_user(username, tags).await?;
    info!("User created successfully: {}", username);

    iam.attach_user_policy(username, S3_FULL_ACCESS_POLICY_ARN)
        .await?;
    info!("Attached AmazonS3FullAccess policy to user: {}", username);

    let access_key = iam.create_access_key(username).await?;
    info!("Access key created for user: {}", username);

    Ok(CreateUserResult {
        operation: Operation::CreateUser,
        username: username.to_string(),
        arn: user.arn,
        user_id: user.user_id,
        created_date: format_timestamp(&user.created),
        access_key_id: access_key.access_key_id,
        secret_access_key: access_key.secret_access_key,
        policy_attached: S3_FULL_ACCESS_POLICY_ARN.to_string(),
        message: "User created successfully".to_string(),
        warning: "Store the secret access key securely. It cannot be retrieved again."
            .to_string(),
    })
}
