use super::error::{ProxyError, ProxyResult};
use super::handlers;
use crate::common::{is_valid_username, Operation, ProxyRequest, ProxyResponse, Tag};
use crate::iam::IamControlPlane;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Turns transport events into IAM calls and IAM results into response
/// envelopes. Never fails: every error becomes an error envelope.
#[derive(Clone)]
pub struct RequestDispatcher {
    iam: Arc<dyn IamControlPlane>,
}

impl RequestDispatcher {
    pub fn new(iam: Arc<dyn IamControlPlane>) -> Self {
        Self { iam }
    }

    /// Handle one transport event, e.g. an API Gateway proxy event or a
    /// direct Lambda invocation payload
    #[instrument(skip(self, event))]
    pub async fn handle_event(&self, event: Value) -> ProxyResponse {
        match self.process_event(event).await {
            Ok(body) => ProxyResponse::ok(body),
            Err(e) => {
                let status = e.status_code();
                if let ProxyError::Remote {
                    code: Some(code), ..
                } = &e
                {
                    error!(error_code = %code, "AWS ClientError: {}", e);
                } else if status >= 500 {
                    error!("Request failed: {}", e);
                } else {
                    warn!("Rejected request: {}", e);
                }
                ProxyResponse::error(status, &e.to_string())
            }
        }
    }

    async fn process_event(&self, event: Value) -> ProxyResult<String> {
        let body = Self::extract_body(event)?;
        let request = Self::parse_request(&body)?;
        debug!("Dispatching {}", request.operation());
        self.execute(request).await
    }

    /// Find the request body: a JSON string in `body`, an object in `body`,
    /// or the event itself when it has no `body` field
    fn extract_body(event: Value) -> ProxyResult<Map<String, Value>> {
        let body = match event {
            Value::Object(mut fields) => match fields.remove("body") {
                Some(Value::String(raw)) => serde_json::from_str(&raw)?,
                Some(body) => body,
                None => Value::Object(fields),
            },
            other => other,
        };

        match body {
            Value::Object(fields) => Ok(fields),
            Value::Null => Err(ProxyError::unexpected("request body is empty")),
            other => Err(ProxyError::unexpected(format!(
                "request body must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Validate the body and build a typed request
    fn parse_request(body: &Map<String, Value>) -> ProxyResult<ProxyRequest> {
        let name = match body.get("operation") {
            None => return Err(ProxyError::missing_operation()),
            Some(value) if is_blank(value) => return Err(ProxyError::missing_operation()),
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
        };
        let operation =
            Operation::parse(&name).ok_or_else(|| ProxyError::unknown_operation(&name))?;

        let username = if operation.requires_username() {
            Some(Self::username(body, operation)?)
        } else {
            None
        };

        Ok(match (operation, username) {
            (Operation::CreateUser, Some(username)) => ProxyRequest::CreateUser {
                username,
                tags: Self::tags(body)?,
            },
            (Operation::DeleteUser, Some(username)) => ProxyRequest::DeleteUser { username },
            (Operation::GetUser, Some(username)) => ProxyRequest::GetUser { username },
            (Operation::ListUsers, _) => ProxyRequest::ListUsers,
            (operation, None) => return Err(ProxyError::missing_username(operation)),
        })
    }

    fn username(body: &Map<String, Value>, operation: Operation) -> ProxyResult<String> {
        let username = match body.get("username") {
            None => None,
            Some(value) if is_blank(value) => None,
            Some(Value::String(name)) => Some(name.as_str()),
            Some(_) => return Err(ProxyError::invalid_username()),
        }
        .ok_or_else(|| ProxyError::missing_username(operation))?;

        if !is_valid_username(username) {
            return Err(ProxyError::invalid_username());
        }
        Ok(username.to_string())
    }

    fn tags(body: &Map<String, Value>) -> ProxyResult<Vec<Tag>> {
        match body.get("tags") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(tags) => Vec::<Tag>::deserialize(tags)
                .map_err(|e| ProxyError::unexpected(format!("invalid tags: {}", e))),
        }
    }

    async fn execute(&self, request: ProxyRequest) -> ProxyResult<String> {
        let iam = self.iam.as_ref();
        let body = match request {
            ProxyRequest::CreateUser { username, tags } => {
                serde_json::to_string(&handlers::create_user(iam, &username, &tags).await?)?
            }
            ProxyRequest::DeleteUser { username } => {
                serde_json::to_string(&handlers::delete_user(iam, &username).await?)?
            }
            ProxyRequest::ListUsers => serde_json::to_string(&handlers::list_users(iam).await?)?,
            ProxyRequest::GetUser { username } => {
                serde_json::to_string(&handlers::get_user(iam, &username).await?)?
            }
        };
        Ok(body)
    }
}

/// Values a caller can send to mean "not provided": null, false, zero and
/// empty strings, arrays or objects
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
