use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// AWS configuration shared by every hosting mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region override; falls back to the default provider chain, then us-east-1
    #[serde(default)]
    pub region: Option<String>,

    /// Named profile to load credentials from
    #[serde(default)]
    pub profile: Option<String>,
}

impl AwsConfig {
    /// Load the SDK configuration used to build the IAM and STS clients
    pub async fn load(&self) -> SdkConfig {
        let region_provider = RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(default_aws_region());

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        loader.load().await
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins when set; otherwise the configured level applies
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(default_log_level()))
        })
    }

    /// Install the global tracing subscriber
    pub fn init(&self) {
        let builder = tracing_subscriber::fmt().with_env_filter(self.env_filter());
        if self.json_format {
            builder.json().with_ansi(false).init();
        } else {
            builder.init();
        }
    }
}

fn default_aws_region() -> &'static str {
    "us-east-1"
}

fn default_log_level() -> String {
    "info".to_string()
}
