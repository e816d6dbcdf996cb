use hyper::{Body, Method, Request, Response, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::common::ProxyResponse;
use crate::server::ProxyService;

impl ProxyService {
    /// Entry point for every HTTP request.
    ///
    /// `POST` bodies are handed to the dispatcher exactly like the `body`
    /// field of an API Gateway event, so both surfaces answer identically.
    #[instrument(skip(self, req), fields(request_id = %Uuid::new_v4()))]
    pub async fn handle_request(&self, req: Request<Body>) -> Result<Response<Body>, Infallible> {
        let response = match (req.method(), req.uri().path()) {
            (&Method::GET, "/health") => self.health_response(),
            (&Method::OPTIONS, _) => preflight_response(),
            (&Method::POST, _) => self.invoke(req).await,
            (&Method::GET, _) => render_envelope(ProxyResponse::error(404, "Not Found")),
            _ => render_envelope(ProxyResponse::error(405, "Method Not Allowed")),
        };
        Ok(response)
    }

    async fn invoke(&self, req: Request<Body>) -> Response<Body> {
        info!("Received {} {}", req.method(), req.uri().path());

        let bytes = match hyper::body::to_bytes(req.into_body()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read request body: {}", e);
                return render_envelope(ProxyResponse::error(
                    500,
                    &format!("Error: failed to read request body: {}", e),
                ));
            }
        };

        let raw = match String::from_utf8(bytes.to_vec()) {
            Ok(raw) => raw,
            Err(e) => {
                return render_envelope(ProxyResponse::error(
                    500,
                    &format!("Error: request body is not valid UTF-8: {}", e),
                ));
            }
        };

        let envelope = self.dispatcher.handle_event(json!({ "body": raw })).await;
        render_envelope(envelope)
    }
}

/// Render a response envelope as an HTTP response
pub fn render_envelope(envelope: ProxyResponse) -> Response<Body> {
    let mut builder = Response::builder().status(envelope.status_code);
    for (name, value) in &envelope.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(Body::from(envelope.body))
        .unwrap_or_else(|e| {
            error!("Failed to build HTTP response: {}", e);
            let mut response = Response::new(Body::from("Internal Server Error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-origin",
        hyper::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        hyper::header::HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        hyper::header::HeaderValue::from_static("content-type"),
    );
    response
}
