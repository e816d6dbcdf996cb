//! In-memory stand-in for IAM used by the handler, dispatcher and HTTP tests.
//!
//! Mirrors the control plane's observable rules: names are unique, a user
//! cannot be deleted while keys or policies remain, and unknown users yield
//! `NoSuchEntity`. Every call is recorded in order.

use super::{AccessKeyMetadata, AttachedPolicy, IamControlPlane, IamError, IamResult, IamUser, NewAccessKey};
use crate::common::Tag;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateUser(String),
    AttachUserPolicy(String, String),
    CreateAccessKey(String),
    ListAccessKeys(String),
    DeleteAccessKey(String, String),
    ListAttachedUserPolicies(String),
    DetachUserPolicy(String, String),
    DeleteUser(String),
    ListUsers,
    GetUser(String),
}

impl Call {
    fn action(&self) -> &'static str {
        match self {
            Call::CreateUser(_) => "CreateUser",
            Call::AttachUserPolicy(..) => "AttachUserPolicy",
            Call::CreateAccessKey(_) => "CreateAccessKey",
            Call::ListAccessKeys(_) => "ListAccessKeys",
            Call::DeleteAccessKey(..) => "DeleteAccessKey",
            Call::ListAttachedUserPolicies(_) => "ListAttachedUserPolicies",
            Call::DetachUserPolicy(..) => "DetachUserPolicy",
            Call::DeleteUser(_) => "DeleteUser",
            Call::ListUsers => "ListUsers",
            Call::GetUser(_) => "GetUser",
        }
    }

    fn user_name(&self) -> Option<&str> {
        match self {
            Call::CreateUser(u)
            | Call::AttachUserPolicy(u, _)
            | Call::CreateAccessKey(u)
            | Call::ListAccessKeys(u)
            | Call::DeleteAccessKey(u, _)
            | Call::ListAttachedUserPolicies(u)
            | Call::DetachUserPolicy(u, _)
            | Call::DeleteUser(u)
            | Call::GetUser(u) => Some(u),
            Call::ListUsers => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub user: IamUser,
    pub tags: Vec<Tag>,
    pub policies: Vec<AttachedPolicy>,
    pub keys: Vec<AccessKeyMetadata>,
}

struct Failure {
    action: &'static str,
    user_name: Option<String>,
    code: String,
    message: String,
}

#[derive(Default)]
struct State {
    users: Vec<FakeUser>,
    calls: Vec<Call>,
    failures: Vec<Failure>,
    next_id: u32,
}

impl State {
    fn user(&self, action: &'static str, user_name: &str) -> IamResult<&FakeUser> {
        self.users
            .iter()
            .find(|u| u.user.user_name == user_name)
            .ok_or_else(|| no_such_entity(action, user_name))
    }

    fn user_mut(&mut self, action: &'static str, user_name: &str) -> IamResult<&mut FakeUser> {
        self.users
            .iter_mut()
            .find(|u| u.user.user_name == user_name)
            .ok_or_else(|| no_such_entity(action, user_name))
    }

    fn next_suffix(&mut self) -> String {
        self.next_id += 1;
        format!("{:016}", self.next_id)
    }
}

fn no_such_entity(action: &'static str, user_name: &str) -> IamError {
    IamError::service(
        action,
        Some("NoSuchEntity".to_string()),
        format!("The user with name {} cannot be found.", user_name),
    )
}

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

fn policy_name(policy_arn: &str) -> String {
    policy_arn.rsplit('/').next().unwrap_or(policy_arn).to_string()
}

#[derive(Default)]
pub struct FakeIamControlPlane {
    state: Mutex<State>,
}

impl FakeIamControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user that already exists in the account
    pub fn with_user(self, user_name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let suffix = state.next_suffix();
            state.users.push(FakeUser {
                user: IamUser {
                    user_name: user_name.to_string(),
                    arn: format!("arn:aws:iam::123456789012:user/{}", user_name),
                    user_id: format!("AIDA{}", suffix),
                    created: created_at(),
                },
                tags: Vec::new(),
                policies: Vec::new(),
                keys: Vec::new(),
            });
        }
        self
    }

    pub fn with_policy(self, user_name: &str, policy_arn: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let user = state.user_mut("Seed", user_name).unwrap();
            user.policies.push(AttachedPolicy {
                policy_name: policy_name(policy_arn),
                policy_arn: policy_arn.to_string(),
            });
        }
        self
    }

    pub fn with_access_key(self, user_name: &str, access_key_id: &str, status: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let user = state.user_mut("Seed", user_name).unwrap();
            user.keys.push(AccessKeyMetadata {
                access_key_id: access_key_id.to_string(),
                status: status.to_string(),
                created: Some(created_at()),
            });
        }
        self
    }

    /// Make every call to `action` fail (for any user)
    pub fn fail_on(self, action: &'static str, code: &str, message: &str) -> Self {
        self.push_failure(action, None, code, message)
    }

    /// Make calls to `action` fail for one user only
    pub fn fail_on_user(
        self,
        action: &'static str,
        user_name: &str,
        code: &str,
        message: &str,
    ) -> Self {
        self.push_failure(action, Some(user_name.to_string()), code, message)
    }

    fn push_failure(
        self,
        action: &'static str,
        user_name: Option<String>,
        code: &str,
        message: &str,
    ) -> Self {
        self.state.lock().unwrap().failures.push(Failure {
            action,
            user_name,
            code: code.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn user(&self, user_name: &str) -> Option<FakeUser> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.user.user_name == user_name)
            .cloned()
    }

    /// Record the call and return the injected failure, if any
    fn record(&self, state: &mut State, call: Call) -> IamResult<()> {
        let action = call.action();
        let user_name = call.user_name().map(str::to_string);
        state.calls.push(call);

        match state.failures.iter().find(|f| {
            f.action == action && (f.user_name.is_none() || f.user_name == user_name)
        }) {
            Some(failure) => Err(IamError::service(
                action,
                Some(failure.code.clone()),
                failure.message.clone(),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IamControlPlane for FakeIamControlPlane {
    async fn create_user(&self, user_name: &str, tags: &[Tag]) -> IamResult<IamUser> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::CreateUser(user_name.to_string()))?;

        if state.users.iter().any(|u| u.user.user_name == user_name) {
            return Err(IamError::service(
                "CreateUser",
                Some("EntityAlreadyExists".to_string()),
                format!("User with name {} already exists.", user_name),
            ));
        }

        let suffix = state.next_suffix();
        let user = IamUser {
            user_name: user_name.to_string(),
            arn: format!("arn:aws:iam::123456789012:user/{}", user_name),
            user_id: format!("AIDA{}", suffix),
            created: created_at(),
        };
        state.users.push(FakeUser {
            user: user.clone(),
            tags: tags.to_vec(),
            policies: Vec::new(),
            keys: Vec::new(),
        });
        Ok(user)
    }

    async fn attach_user_policy(&self, user_name: &str, policy_arn: &str) -> IamResult<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::AttachUserPolicy(user_name.to_string(), policy_arn.to_string()),
        )?;

        let user = state.user_mut("AttachUserPolicy", user_name)?;
        if !user.policies.iter().any(|p| p.policy_arn == policy_arn) {
            user.policies.push(AttachedPolicy {
                policy_name: policy_name(policy_arn),
                policy_arn: policy_arn.to_string(),
            });
        }
        Ok(())
    }

    async fn create_access_key(&self, user_name: &str) -> IamResult<NewAccessKey> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::CreateAccessKey(user_name.to_string()))?;

        let suffix = state.next_suffix();
        let access_key_id = format!("AKIA{}", suffix);
        let user = state.user_mut("CreateAccessKey", user_name)?;
        user.keys.push(AccessKeyMetadata {
            access_key_id: access_key_id.clone(),
            status: "Active".to_string(),
            created: Some(created_at()),
        });
        Ok(NewAccessKey {
            access_key_id,
            secret_access_key: format!("secret/{}", suffix),
        })
    }

    async fn list_access_keys(&self, user_name: &str) -> IamResult<Vec<AccessKeyMetadata>> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::ListAccessKeys(user_name.to_string()))?;
        Ok(state.user("ListAccessKeys", user_name)?.keys.clone())
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> IamResult<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::DeleteAccessKey(user_name.to_string(), access_key_id.to_string()),
        )?;

        let user = state.user_mut("DeleteAccessKey", user_name)?;
        let before = user.keys.len();
        user.keys.retain(|k| k.access_key_id != access_key_id);
        if user.keys.len() == before {
            return Err(IamError::service(
                "DeleteAccessKey",
                Some("NoSuchEntity".to_string()),
                format!("The Access Key with id {} cannot be found.", access_key_id),
            ));
        }
        Ok(())
    }

    async fn list_attached_user_policies(
        &self,
        user_name: &str,
    ) -> IamResult<Vec<AttachedPolicy>> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::ListAttachedUserPolicies(user_name.to_string()),
        )?;
        Ok(state
            .user("ListAttachedUserPolicies", user_name)?
            .policies
            .clone())
    }

    async fn detach_user_policy(&self, user_name: &str, policy_arn: &str) -> IamResult<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::DetachUserPolicy(user_name.to_string(), policy_arn.to_string()),
        )?;

        let user = state.user_mut("DetachUserPolicy", user_name)?;
        let before = user.policies.len();
        user.policies.retain(|p| p.policy_arn != policy_arn);
        if user.policies.len() == before {
            return Err(IamError::service(
                "DetachUserPolicy",
                Some("NoSuchEntity".to_string()),
                format!("Policy {} was not found.", policy_arn),
            ));
        }
        Ok(())
    }

    async fn delete_user(&self, user_name: &str) -> IamResult<()> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::DeleteUser(user_name.to_string()))?;

        let user = state.user("DeleteUser", user_name)?;
        if !user.keys.is_empty() || !user.policies.is_empty() {
            return Err(IamError::service(
                "DeleteUser",
                Some("DeleteConflict".to_string()),
                "Cannot delete entity, must delete access keys and detach policies first.",
            ));
        }
        state.users.retain(|u| u.user.user_name != user_name);
        Ok(())
    }

    async fn list_users(&self) -> IamResult<Vec<IamUser>> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::ListUsers)?;
        Ok(state.users.iter().map(|u| u.user.clone()).collect())
    }

    async fn get_user(&self, user_name: &str) -> IamResult<IamUser> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::GetUser(user_name.to_string()))?;
        Ok(state.user("GetUser", user_name)?.user.clone())
    }
}
