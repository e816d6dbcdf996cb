use clap::{Args, Parser};
use std::net::IpAddr;

use crate::common::config::AwsConfig;

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    /// Port to listen on for proxy requests
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: IpAddr,
}

#[derive(Parser, Debug, Clone)]
pub struct LambdaCommand {}

/// AWS settings shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct AwsArgs {
    /// AWS region for IAM and STS calls
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// AWS credentials profile
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Skip the startup caller identity check
    #[arg(long, env = "SKIP_IDENTITY_CHECK", global = true)]
    pub skip_identity_check: bool,
}

impl AwsArgs {
    pub fn config(&self) -> AwsConfig {
        AwsConfig {
            region: self.region.clone(),
            profile: self.profile.clone(),
        }
    }
}
