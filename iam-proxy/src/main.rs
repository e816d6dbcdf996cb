use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

mod commands;
mod common;
mod iam;
mod lambda;
mod server;

use commands::{AwsArgs, LambdaCommand, ServerCommand};
use common::config::LoggingConfig;
use iam::{AwsIamControlPlane, IamControlPlane};

#[derive(Parser)]
#[command(
    name = "iam-proxy",
    about = "JSON proxy for provisioning IAM users with S3 access keys",
    version = env!("CARGO_PKG_VERSION"),
    author = "ktruck"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON (always on under Lambda)
    #[arg(long, global = true, env = "JSON_LOGS")]
    json_logs: bool,

    #[command(flatten)]
    aws: AwsArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve proxy requests over HTTP
    Server(ServerCommand),
    /// Serve proxy requests from the AWS Lambda runtime
    Lambda(LambdaCommand),
}

impl Cli {
    /// Only the long-running server resolves its caller identity at startup
    fn identity_check_enabled(&self) -> bool {
        matches!(self.command, Commands::Server(_)) && !self.aws.skip_identity_check
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: if cli.verbose {
            "debug".to_string()
        } else {
            cli.log_level.clone()
        },
        json_format: cli.json_logs || matches!(cli.command, Commands::Lambda(_)),
    };
    logging.init();

    let sdk_config = cli.aws.config().load().await;
    let check_identity = cli.identity_check_enabled();
    let iam: Arc<dyn IamControlPlane> = Arc::new(AwsIamControlPlane::from_sdk_config(&sdk_config));

    match cli.command {
        Commands::Server(server_cmd) => {
            info!("Starting IAM proxy server");
            if check_identity {
                iam::log_caller_identity(&sdk_config).await;
            }
            server::run(server_cmd, iam).await?;
        }
        Commands::Lambda(_) => {
            info!("Starting IAM proxy Lambda handler");
            lambda::run(iam).await?;
        }
    }

    Ok(())
}
