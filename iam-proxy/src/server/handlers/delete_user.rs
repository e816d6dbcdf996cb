use serde::Serialize;
use tracing::{info, instrument};

use crate::common::Operation;
use crate::iam::IamControlPlane;
use crate::server::error::ProxyResult;

#[derive(Debug, Clone, Serialize)]
pub struct DeleteUserResult {
    pub operation: Operation,
    pub username: String,
    pub message: String,
}

/// Delete a user after removing every access key and detaching every
/// managed policy; IAM refuses DeleteUser while either remains.
#[instrument(skip(iam))]
pub async fn delete_user(iam: &dyn IamControlPlane, username: &str) -> ProxyResult<DeleteUserResult> {
    info!("Deleting user: {}", username);

    for key in iam.list_access_keys(username).await? {
        iam.delete_access_key(username, &key.access_key_id).await?;
        info!("Deleted access key: {}", key.access_key_id);
    }

    for policy in iam.list_attached_user_policies(username).await? {
        iam.detach_user_policy(username, &policy.policy_arn).await?;
        info!("Detached policy: {}", policy.policy_arn);
    }

    iam.delete_user(username).await?;
    info!("User deleted successfully: {}", username);

    Ok(DeleteUserResult {
        operation: Operation::DeleteUser,
        username: username.to_string(),
        message: "User deleted successfully".to_string(),
    })
}
