//! # Platform Webhook Service
//!
//! Binary entry point for the webhook receiver.
//!
//! This executable:
//! - Loads layered configuration from files and environment
//! - Initializes logging
//! - Builds the authenticated webhook receiver and registers handlers
//! - Starts the HTTP server

use platform_api_sdk::LoggingHandler;
use platform_webhook_service::{
    build_receiver_from_env, config::config_path_from_env, load_config, start_server, AppState,
    LoggingConfig,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration is loaded before logging so its logging section applies.
    let config_path = config_path_from_env();
    let loaded = load_config(config_path.as_deref());

    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);

    info!("Starting Platform Webhook Service");
    if let Some(path) = &config_path {
        info!(path = %path.display(), "Loading configuration from explicit path");
    }

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Service configuration is invalid; aborting");
            std::process::exit(3);
        }
    };

    let receiver = match build_receiver_from_env(&service_config).await {
        Ok(receiver) => receiver,
        Err(e) => {
            error!(
                error = %e,
                "Webhook secret is missing or empty; set webhooks.secret or PLATFORM_WEBHOOK_SECRET"
            );
            std::process::exit(e.exit_code());
        }
    };
    receiver.add_handler(Arc::new(LoggingHandler::new())).await;

    let state = AppState::new(service_config, receiver);

    if let Err(e) = start_server(state).await {
        error!(error = %e, "Server terminated with an error");
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "platform_webhook_service={level},platform_api_sdk={level},tower_http=debug",
            level = logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
