use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Managed policy attached to every user created through the proxy
pub const S3_FULL_ACCESS_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3FullAccess";

/// Operations accepted in the `operation` field of a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateUser,
    DeleteUser,
    ListUsers,
    GetUser,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::CreateUser,
        Operation::DeleteUser,
        Operation::ListUsers,
        Operation::GetUser,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateUser => "create_user",
            Operation::DeleteUser => "delete_user",
            Operation::ListUsers => "list_users",
            Operation::GetUser => "get_user",
        }
    }

    pub fn requires_username(&self) -> bool {
        !matches!(self, Operation::ListUsers)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IAM tag in the shape callers send it (`{"Key": .., "Value": ..}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[cfg(test)]
impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A validated request, ready to be executed against IAM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRequest {
    CreateUser { username: String, tags: Vec<Tag> },
    DeleteUser { username: String },
    ListUsers,
    GetUser { username: String },
}

impl ProxyRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ProxyRequest::CreateUser { .. } => Operation::CreateUser,
            ProxyRequest::DeleteUser { .. } => Operation::DeleteUser,
            ProxyRequest::ListUsers => Operation::ListUsers,
            ProxyRequest::GetUser { .. } => Operation::GetUser,
        }
    }
}

/// Transport envelope returned to the caller.
///
/// Serializes to `{"statusCode": .., "body": "<json>", "headers": {..}}`, the
/// shape API Gateway expects from a proxy integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ProxyResponse {
    pub fn ok(body: String) -> Self {
        let mut headers = json_headers();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        Self {
            status_code: 200,
            body,
            headers,
        }
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: serde_json::json!({ "error": message }).to_string(),
            headers: json_headers(),
        }
    }
}

fn json_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}
