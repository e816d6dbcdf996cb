use anyhow::Result;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::common::ProxyResponse;
use crate::iam::IamControlPlane;
use crate::server::RequestDispatcher;

/// Serve invocations from the Lambda runtime API until the runtime shuts
/// the process down
pub async fn run(iam: Arc<dyn IamControlPlane>) -> Result<()> {
    info!("🚀 Starting IAM proxy Lambda handler");
    let dispatcher = RequestDispatcher::new(iam);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let dispatcher = dispatcher.clone();
        async move { handle(&dispatcher, event).await }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime error: {}", e))
}

async fn handle(
    dispatcher: &RequestDispatcher,
    event: LambdaEvent<Value>,
) -> Result<ProxyResponse, Error> {
    let (payload, context) = event.into_parts();
    let span = info_span!("invocation", request_id = %context.request_id);
    Ok(dispatcher.handle_event(payload).instrument(span).await)
}
