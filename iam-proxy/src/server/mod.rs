use anyhow::Result;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::commands::ServerCommand;
use crate::iam::IamControlPlane;
pub use dispatcher::RequestDispatcher;
pub use service::ProxyService;

pub mod dispatcher;
pub mod error;
pub mod handlers;
mod service;

pub async fn run(args: ServerCommand, iam: Arc<dyn IamControlPlane>) -> Result<()> {
    info!("🚀 Starting IAM proxy HTTP server");
    info!("📡 Port: {}", args.port);

    let service = ProxyService::new(iam);

    let make_svc = make_service_fn(move |_conn| {
        let service = service.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let service = service.clone();
                async move { service.handle_request(req).await }
            }))
        }
    });

    let addr = SocketAddr::from((args.bind, args.port));
    let server = Server::try_bind(&addr)?
        .serve(make_svc)
        .with_graceful_shutdown(shutdown_signal());

    info!("🌐 Listening on {}", addr);
    server.await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
