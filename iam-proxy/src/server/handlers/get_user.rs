use serde::Serialize;
use tracing::{info, instrument};

use crate::common::Operation;
use crate::iam::{format_timestamp, IamControlPlane};
use crate::server::error::ProxyResult;

#[derive(Debug, Clone, Serialize)]
pub struct PolicyDetails {
    pub policy_name: String,
    pub policy_arn: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessKeyDetails {
    pub access_key_id: String,
    pub status: String,
    pub created_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUserResult {
    pub operation: Operation,
    pub username: String,
    pub arn: String,
    pub user_id: String,
    pub created_date: String,
    pub attached_policies: Vec<PolicyDetails>,
    pub access_keys: Vec<AccessKeyDetails>,
}

/// Describe one user, its managed policies and its access keys (never
/// secrets). Unlike `list_users`, a failed policy lookup fails the request.
#[instrument(skip(iam))]
pub async fn get_user(iam: &dyn IamControlPlane, username: &str) -> ProxyResult<GetUserResult> {
    info!("Getting user details: {}", username);

    let user = iam.get_user(username).await?;
    let policies = iam.list_attached_user_policies(username).await?;
    let access_keys = iam.list_access_keys(username).await?;

    Ok(GetUserResult {
        operation: Operation::GetUser,
        created_date: format_timestamp(&user.created),
        username: user.user_name,
        arn: user.arn,
        user_id: user.user_id,
        attached_policies: policies
            .into_iter()
            .map(|p| PolicyDetails {
                policy_name: p.policy_name,
                policy_arn: p.policy_arn,
            })
            .collect(),
        access_keys: access_keys
            .into_iter()
            .map(|k| AccessKeyDetails {
                created_date: k.created.as_ref().map(format_timestamp),
                access_key_id: k.access_key_id,
                status: k.status,
            })
            .collect(),
    })
}
