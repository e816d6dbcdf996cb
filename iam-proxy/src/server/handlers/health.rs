use hyper::{Body, Response, StatusCode};
use serde_json::json;

use crate::server::ProxyService;

impl ProxyService {
    pub fn health_response(&self) -> Response<Body> {
        let started_at = self
            .started_at
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_else(|_| std::time::Duration::from_secs(0))
            .as_secs();

        let health_info = json!({
            "status": "healthy",
            "instance_id": self.server_instance_id,
            "started_at": started_at,
        });

        let mut response = Response::new(Body::from(health_info.to_string()));
        *response.status_mut() = StatusCode::OK;
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
        response
    }
}
