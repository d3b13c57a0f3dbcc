//! # Platform CLI
//!
//! Command-line interface for the Platform API.
//!
//! This module provides CLI commands for:
//! - Signing and verifying webhook payloads
//! - Querying analytics and search
//! - Checking entitlements
//! - Managing webhook endpoints
//! - Running the end-to-end demo flow

pub mod commands;
pub mod output;

use clap::{Args, Parser, Subcommand};
use platform_api_sdk::{
    client::{AccessType, SearchType},
    ApiError,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use output::OutputFormat;

// ============================================================================
// CLI Structure
// ============================================================================

/// Platform CLI - client for the Platform API and its webhooks
#[derive(Parser)]
#[command(name = "platform")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Platform API and its webhooks")]
#[command(
    long_about = "Signs and verifies webhook payloads and calls the analytics, search, entitlement and webhook-management APIs"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "PLATFORM_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// API key used for authenticated requests
    #[arg(long, global = true, env = "PLATFORM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "PLATFORM_BASE_URL")]
    pub base_url: Option<String>,

    /// Logging level
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compute the signature of a webhook payload
    Sign {
        #[command(flatten)]
        payload: PayloadArgs,

        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Check a webhook payload against a signature
    Verify {
        #[command(flatten)]
        payload: PayloadArgs,

        #[command(flatten)]
        secret: SecretArgs,

        /// Signature to check (lowercase hex)
        #[arg(short, long)]
        signature: String,
    },

    /// Analytics queries
    Analytics {
        #[command(subcommand)]
        action: AnalyticsCommands,
    },

    /// Content search
    Search {
        #[command(subcommand)]
        action: SearchCommands,
    },

    /// Entitlement checks
    Entitlements {
        #[command(subcommand)]
        action: EntitlementCommands,
    },

    /// Webhook endpoint management
    Webhooks {
        #[command(subcommand)]
        action: WebhookCommands,
    },

    /// Run the sample flow against the API
    Demo,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Source of the payload bytes for `sign` and `verify`
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Payload given inline
    #[arg(short, long)]
    pub data: Option<String>,

    /// File holding the payload (`-` for stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Webhook signing secret
#[derive(Args, Debug, Clone)]
pub struct SecretArgs {
    /// Shared webhook secret
    #[arg(long, env = "PLATFORM_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,
}

// ============================================================================
// API Commands
// ============================================================================

/// Analytics subcommands
#[derive(Subcommand)]
pub enum AnalyticsCommands {
    /// Platform overview
    Overview {
        #[arg(short, long, default_value = "24h")]
        period: String,
    },

    /// Revenue metrics
    Revenue {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Content performance
    Content {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// User engagement
    Engagement {
        #[arg(short, long, default_value = "24h")]
        period: String,
    },

    /// Payout metrics
    Payouts {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

/// Search subcommands
#[derive(Subcommand)]
pub enum SearchCommands {
    /// Search content
    Content {
        /// Query text
        query: String,

        /// Search strategy (hybrid, semantic or keyword)
        #[arg(short = 't', long = "type", default_value = "hybrid")]
        search_type: SearchType,

        /// Filters as a JSON object
        #[arg(long)]
        filters: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        limit: u32,

        /// Include result metadata
        #[arg(long)]
        include_metadata: bool,
    },

    /// Query suggestions
    Suggestions {
        /// Partial query
        query: String,
    },

    /// Content similar to a given item
    Similar {
        content_id: String,

        #[arg(long, default_value = "10")]
        limit: u32,

        /// Minimum similarity between 0 and 1
        #[arg(long, default_value = "0.7")]
        threshold: f64,
    },

    /// Trending content
    Trending {
        #[arg(short, long, default_value = "24h")]
        period: String,

        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

/// Entitlement subcommands
#[derive(Subcommand)]
pub enum EntitlementCommands {
    /// Check a single entitlement
    Verify {
        user_id: String,

        content_id: String,

        /// Access type (view, stream or download)
        #[arg(short, long, default_value = "view")]
        access_type: AccessType,
    },

    /// Check several entitlements at once
    Bulk {
        /// `USER_ID,CONTENT_ID[,ACCESS_TYPE]`, repeatable
        #[arg(long = "check", required = true, value_parser = commands::parse_entitlement_check)]
        checks: Vec<platform_api_sdk::client::EntitlementCheck>,
    },

    /// Entitlements held by a user
    User {
        user_id: String,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        limit: u32,

        #[arg(long, default_value = "active")]
        status: String,
    },

    /// Access statistics for a content item
    Stats { content_id: String },
}

/// Webhook endpoint subcommands
#[derive(Subcommand)]
pub enum WebhookCommands {
    /// Register an endpoint
    Create {
        /// Delivery URL
        url: String,

        /// Event type to subscribe to, repeatable
        #[arg(short, long = "event", required = true)]
        events: Vec<String>,

        /// Delivery attempts before giving up
        #[arg(long)]
        max_retries: Option<u32>,

        /// Backoff growth factor between attempts
        #[arg(long)]
        backoff_multiplier: Option<u32>,

        /// Upper bound on the delay between attempts
        #[arg(long)]
        max_backoff_seconds: Option<u32>,
    },

    /// List endpoints
    List,

    /// Show one endpoint
    Get { endpoint_id: String },

    /// Update an endpoint
    Update {
        endpoint_id: String,

        /// Fields to change as a JSON object
        #[arg(short, long)]
        data: String,
    },

    /// Delete an endpoint
    Delete { endpoint_id: String },

    /// Send a test event to an endpoint
    Test {
        endpoint_id: String,

        #[arg(short, long, default_value = "purchase.completed")]
        event_type: String,

        /// Test event data as a JSON object
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Event types available for subscription
    Events,
}

// ============================================================================
// Configuration
// ============================================================================

/// CLI configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// API connection settings
    pub api: ApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Output formatting preferences
    pub output: OutputConfig,
}

/// API connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: platform_api_sdk::client::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Default configuration file, `<config dir>/platform/cli.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("platform").join("cli.toml"))
}

/// Load configuration from the default location and an explicit file.
///
/// The explicit file must exist; the default one is optional.
pub fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(default_path) = default_config_path() {
        builder = builder.add_source(
            config::File::from(default_path)
                .required(false)
                .format(config::FileFormat::Toml),
        );
    }

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        builder = builder.add_source(
            config::File::from(path)
                .required(true)
                .format(config::FileFormat::Toml),
        );
    }

    let config: CliConfig = builder.build()?.try_deserialize()?;
    Ok(config)
}

// ============================================================================
// Errors
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Client setup failed: {0}")]
    Client(#[from] platform_api_sdk::ConfigError),

    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Signature does not match payload")]
    SignatureMismatch,

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {message}")]
    Output { message: String },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Configuration(_) | CliError::Client(_) => 1,
            CliError::Api(_) => 2,
            CliError::SignatureMismatch => 3,
            CliError::InvalidArgument { .. } => 4,
            CliError::Io(_) => 5,
            CliError::Output { .. } => 6,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] config::ConfigError),

    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },
}

// ============================================================================
// Entry Points
// ============================================================================

/// Parse the process arguments and run the selected command.
pub async fn run_cli() -> Result<(), CliError> {
    run(Cli::parse()).await
}

/// Run an already-parsed command line.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_configuration(cli.config.as_deref())?;

    initialize_logging(&cli, &config.logging);

    let context = commands::Context::new(&cli, config);
    commands::execute(cli.command, &context).await
}

/// Initialize logging based on CLI arguments and configuration.
///
/// Logs go to stderr so command output on stdout stays machine readable.
fn initialize_logging(cli: &Cli, config: &LoggingConfig) {
    let level = cli.log_level.as_deref().unwrap_or(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("platform_cli={level},platform_api_sdk={level}").into());

    let registry = tracing_subscriber::registry().with(filter);

    // A subscriber may already be installed when running under tests.
    let _ = if cli.json_logs || config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
