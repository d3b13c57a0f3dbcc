//! Command implementations.

use crate::{
    output::{render, OutputFormat},
    AnalyticsCommands, Cli, CliConfig, CliError, Commands, ConfigError, EntitlementCommands,
    PayloadArgs, SearchCommands, SecretArgs, WebhookCommands,
};
use clap::CommandFactory;
use platform_api_sdk::{
    client::{AccessType, EntitlementCheck, SearchRequest, SearchType, WebhookRetryPolicy},
    ApiKey, ApiResponse, ClientConfig, MessageAuthenticator, PlatformClient,
};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Settings resolved from flags, environment and configuration file.
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Context {
    /// Flags win over the configuration file.
    pub fn new(cli: &Cli, config: CliConfig) -> Self {
        Self {
            format: cli.format.unwrap_or(config.output.format),
            api_key: cli.api_key.clone(),
            base_url: cli.base_url.clone().unwrap_or(config.api.base_url),
            timeout: Duration::from_secs(config.api.timeout_seconds),
            max_retries: config.api.max_retries,
        }
    }

    /// Build an API client from the resolved settings.
    pub fn client(&self) -> Result<PlatformClient, CliError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "api key (--api-key or PLATFORM_API_KEY)".to_string(),
            })?;

        let config = ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout)
            .with_max_retries(self.max_retries);

        Ok(PlatformClient::new(ApiKey::new(key)?, config)?)
    }

    fn emit(&self, value: &Value) -> Result<(), CliError> {
        println!("{}", render(value, self.format)?);
        Ok(())
    }

    fn emit_response(&self, response: &ApiResponse) -> Result<(), CliError> {
        let mut value = json!({ "data": response.data });
        if let Some(meta) = &response.meta {
            value["meta"] = meta.clone();
        }
        self.emit(&value)
    }
}

/// Dispatch a parsed command.
pub async fn execute(command: Commands, context: &Context) -> Result<(), CliError> {
    match command {
        Commands::Sign { payload, secret } => execute_sign(&payload, &secret, context).await,
        Commands::Verify {
            payload,
            secret,
            signature,
        } => execute_verify(&payload, &secret, &signature, context).await,
        Commands::Analytics { action } => execute_analytics(action, context).await,
        Commands::Search { action } => execute_search(action, context).await,
        Commands::Entitlements { action } => execute_entitlements(action, context).await,
        Commands::Webhooks { action } => execute_webhooks(action, context).await,
        Commands::Demo => execute_demo(context).await,
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "platform",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

// ============================================================================
// Signatures
// ============================================================================

async fn execute_sign(
    payload: &PayloadArgs,
    secret: &SecretArgs,
    context: &Context,
) -> Result<(), CliError> {
    let payload = read_payload(payload).await?;
    let signature = authenticator(secret)?.sign(&payload);

    match context.format {
        OutputFormat::Text => {
            println!("{}", signature);
            Ok(())
        }
        _ => context.emit(&json!({ "signature": signature })),
    }
}

async fn execute_verify(
    payload: &PayloadArgs,
    secret: &SecretArgs,
    signature: &str,
    context: &Context,
) -> Result<(), CliError> {
    let payload = read_payload(payload).await?;

    if !authenticator(secret)?.verify(&payload, signature) {
        return Err(CliError::SignatureMismatch);
    }

    match context.format {
        OutputFormat::Text => {
            println!("valid");
            Ok(())
        }
        _ => context.emit(&json!({ "valid": true })),
    }
}

fn authenticator(secret: &SecretArgs) -> Result<MessageAuthenticator, CliError> {
    let secret = secret
        .secret
        .as_deref()
        .ok_or_else(|| ConfigError::MissingRequired {
            key: "webhook secret (--secret or PLATFORM_WEBHOOK_SECRET)".to_string(),
        })?;
    Ok(MessageAuthenticator::new(secret)?)
}

/// Read the payload bytes exactly as given.
pub async fn read_payload(args: &PayloadArgs) -> Result<Vec<u8>, CliError> {
    match (&args.data, &args.file) {
        (Some(data), _) => Ok(data.as_bytes().to_vec()),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buffer = Vec::new();
            tokio::io::stdin().read_to_end(&mut buffer).await?;
            Ok(buffer)
        }
        (None, Some(path)) => {
            debug!(path = %path.display(), "Reading payload from file");
            Ok(tokio::fs::read(path).await?)
        }
        (None, None) => Err(CliError::InvalidArgument {
            arg: "--data/--file".to_string(),
            message: "a payload is required".to_string(),
        }),
    }
}

// ============================================================================
// API Commands
// ============================================================================

async fn execute_analytics(action: AnalyticsCommands, context: &Context) -> Result<(), CliError> {
    let client = context.client()?;

    let response = match action {
        AnalyticsCommands::Overview { period } => client.get_analytics_overview(&period).await?,
        AnalyticsCommands::Revenue {
            start_date,
            end_date,
        } => {
            client
                .get_revenue_metrics(start_date.as_deref(), end_date.as_deref())
                .await?
        }
        AnalyticsCommands::Content { page, limit } => {
            client.get_content_performance(page, limit).await?
        }
        AnalyticsCommands::Engagement { period } => client.get_user_engagement(&period).await?,
        AnalyticsCommands::Payouts { page, limit } => client.get_payout_metrics(page, limit).await?,
    };

    context.emit_response(&response)
}

async fn execute_search(action: SearchCommands, context: &Context) -> Result<(), CliError> {
    let client = context.client()?;

    let response = match action {
        SearchCommands::Content {
            query,
            search_type,
            filters,
            page,
            limit,
            include_metadata,
        } => {
            let mut request = SearchRequest::new(query)
                .with_type(search_type)
                .with_page(page)
                .with_limit(limit)
                .with_metadata(include_metadata);
            if let Some(filters) = filters {
                request = request.with_filters(parse_json_object("--filters", &filters)?);
            }
            client.search_content(&request).await?
        }
        SearchCommands::Suggestions { query } => client.get_search_suggestions(&query).await?,
        SearchCommands::Similar {
            content_id,
            limit,
            threshold,
        } => {
            client
                .find_similar_content(&content_id, limit, threshold)
                .await?
        }
        SearchCommands::Trending { period, limit } => {
            client.get_trending_content(&period, limit).await?
        }
    };

    context.emit_response(&response)
}

async fn execute_entitlements(
    action: EntitlementCommands,
    context: &Context,
) -> Result<(), CliError> {
    let client = context.client()?;

    let response = match action {
        EntitlementCommands::Verify {
            user_id,
            content_id,
            access_type,
        } => {
            client
                .verify_entitlement(&user_id, &content_id, access_type)
                .await?
        }
        EntitlementCommands::Bulk { checks } => client.bulk_verify_entitlements(&checks).await?,
        EntitlementCommands::User {
            user_id,
            page,
            limit,
            status,
        } => {
            client
                .get_user_entitlements(&user_id, page, limit, &status)
                .await?
        }
        EntitlementCommands::Stats { content_id } => client.get_content_stats(&content_id).await?,
    };

    context.emit_response(&response)
}

async fn execute_webhooks(action: WebhookCommands, context: &Context) -> Result<(), CliError> {
    let client = context.client()?;

    let response = match action {
        WebhookCommands::Create {
            url,
            events,
            max_retries,
            backoff_multiplier,
            max_backoff_seconds,
        } => {
            let policy = delivery_policy(max_retries, backoff_multiplier, max_backoff_seconds);
            let events: Vec<&str> = events.iter().map(String::as_str).collect();
            client.create_webhook_endpoint(&url, &events, policy).await?
        }
        WebhookCommands::List => client.get_webhook_endpoints().await?,
        WebhookCommands::Get { endpoint_id } => client.get_webhook_endpoint(&endpoint_id).await?,
        WebhookCommands::Update { endpoint_id, data } => {
            let updates = parse_json_object("--data", &data)?;
            client.update_webhook_endpoint(&endpoint_id, &updates).await?
        }
        WebhookCommands::Delete { endpoint_id } => {
            client.delete_webhook_endpoint(&endpoint_id).await?
        }
        WebhookCommands::Test {
            endpoint_id,
            event_type,
            data,
        } => {
            let test_data = data
                .map(|d| parse_json_object("--data", &d))
                .transpose()?;
            client
                .test_webhook_endpoint(&endpoint_id, &event_type, test_data)
                .await?
        }
        WebhookCommands::Events => client.get_webhook_events().await?,
    };

    context.emit_response(&response)
}

/// Overrides on top of the default delivery policy, `None` when nothing is set.
pub fn delivery_policy(
    max_retries: Option<u32>,
    backoff_multiplier: Option<u32>,
    max_backoff_seconds: Option<u32>,
) -> Option<WebhookRetryPolicy> {
    if max_retries.is_none() && backoff_multiplier.is_none() && max_backoff_seconds.is_none() {
        return None;
    }

    let defaults = WebhookRetryPolicy::default();
    Some(WebhookRetryPolicy {
        max_retries: max_retries.unwrap_or(defaults.max_retries),
        backoff_multiplier: backoff_multiplier.unwrap_or(defaults.backoff_multiplier),
        max_backoff_seconds: max_backoff_seconds.unwrap_or(defaults.max_backoff_seconds),
    })
}

// ============================================================================
// Demo
// ============================================================================

async fn execute_demo(context: &Context) -> Result<(), CliError> {
    let client = context.client()?;
    let mut summary = Map::new();

    let result = run_demo(&client, &mut summary).await;

    // Steps that completed are reported even when a later one fails.
    context.emit(&Value::Object(summary))?;
    result
}

/// Overview, search, entitlement, endpoint creation and trending, in order.
pub async fn run_demo(
    client: &PlatformClient,
    summary: &mut Map<String, Value>,
) -> Result<(), CliError> {
    let overview = client.get_analytics_overview("7d").await?;
    summary.insert("analyticsOverview".to_string(), overview.data);
    info!("Fetched analytics overview");

    let search = client
        .search_content(
            &SearchRequest::new("fitness workout")
                .with_type(SearchType::Hybrid)
                .with_filters(json!({"category": "fitness", "minDuration": 300}))
                .with_limit(10),
        )
        .await?;
    summary.insert(
        "searchResults".to_string(),
        json!(array_len(&search.data["results"]["items"])),
    );

    let entitlement = client
        .verify_entitlement("user-uuid", "content-uuid", AccessType::Stream)
        .await?;
    summary.insert(
        "hasAccess".to_string(),
        entitlement.data["hasAccess"].clone(),
    );

    let webhook = client
        .create_webhook_endpoint(
            "https://your-app.com/webhooks",
            &["purchase.completed", "content.uploaded"],
            None,
        )
        .await?;
    summary.insert("webhookCreated".to_string(), webhook.data["id"].clone());

    let trending = client.get_trending_content("24h", 5).await?;
    summary.insert(
        "trendingContent".to_string(),
        json!(array_len(&trending.data["trending"])),
    );

    Ok(())
}

fn array_len(value: &Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or(0)
}

// ============================================================================
// Argument parsing
// ============================================================================

/// Parse a JSON object given on the command line.
pub fn parse_json_object(arg: &str, raw: &str) -> Result<Value, CliError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| CliError::InvalidArgument {
        arg: arg.to_string(),
        message: e.to_string(),
    })?;

    if !value.is_object() {
        return Err(CliError::InvalidArgument {
            arg: arg.to_string(),
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Parse `USER_ID,CONTENT_ID[,ACCESS_TYPE]`.
pub fn parse_entitlement_check(raw: &str) -> Result<EntitlementCheck, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();

    let (user_id, content_id, access_type) = match parts.as_slice() {
        [user, content] => (*user, *content, AccessType::default()),
        [user, content, access] => (
            *user,
            *content,
            access.parse::<AccessType>().map_err(|e| e.to_string())?,
        ),
        _ => {
            return Err(format!(
                "expected USER_ID,CONTENT_ID[,ACCESS_TYPE], got '{}'",
                raw
            ))
        }
    };

    if user_id.is_empty() || content_id.is_empty() {
        return Err("user and content ids must not be empty".to_string());
    }

    Ok(EntitlementCheck::new(user_id, content_id, access_type))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
