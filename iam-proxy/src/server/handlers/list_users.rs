use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::common::Operation;
use crate::iam::{format_timestamp, IamControlPlane};
use crate::server::error::ProxyResult;

/// Stand-in for a user's policies when they could not be listed
pub const UNAVAILABLE_POLICIES: &str = "N/A";

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub arn: String,
    pub user_id: String,
    pub created_date: String,
    pub attached_policies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResult {
    pub operation: Operation,
    pub user_count: usize,
    pub users: Vec<UserSummary>,
}

/// List every user with the names of its attached policies.
///
/// A failed policy lookup for one user does not fail the listing; that user
/// reports `["N/A"]` instead.
#[instrument(skip(iam))]
pub async fn list_users(iam: &dyn IamControlPlane) -> ProxyResult<ListUsersResult> {
    info!("Listing all users");

    let mut users = Vec::new();
    for user in iam.list_users().await? {
        let attached_policies = match iam.list_attached_user_policies(&user.user_name).await {
            Ok(policies) => policies.into_iter().map(|p| p.policy_name).collect(),
            Err(e) => {
                warn!(
                    "Could not list policies for user {}: {}",
                    user.user_name, e
                );
                vec![UNAVAILABLE_POLICIES.to_string()]
            }
        };

        users.push(UserSummary {
            created_date: format_timestamp(&user.created),
            username: user.user_name,
            arn: user.arn,
            user_id: user.user_id,
            attached_policies,
        });
    }

    Ok(ListUsersResult {
        operation: Operation::ListUsers,
        user_count: users.len(),
        users,
    })
}
