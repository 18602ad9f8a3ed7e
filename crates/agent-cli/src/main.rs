//! `market-agent`: run the market data tools from the command line
//!
//! ```bash
//! market-agent tools
//! market-agent run income_statement --params '{"symbol": "AAPL", "quarterly": true}'
//! market-agent check-env
//! market-agent cache keys 'AAPL_*'
//! ```

mod render;

use agent_market::cache::RedisStore;
use agent_market::{CacheConfig, CacheLayer, FmpClient, MarketConfig, MarketData, default_registry};
use agent_utils::{LogFormat, check_environment, init_tracing_with};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "market-agent")]
#[command(about = "Financial market data tools for LLM agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Log output format (pretty or json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    /// Filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available tools and their parameters
    Tools,

    /// Execute one tool
    Run {
        /// Tool name, see `tools`
        tool: String,

        /// Tool parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Print the raw JSON output
        #[arg(long)]
        json: bool,
    },

    /// Report which environment variables are set
    CheckEnv,

    /// Inspect the Redis cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Check the cache server answers
    Ping,

    /// List keys matching a glob pattern
    Keys {
        #[arg(default_value = "*")]
        pattern: String,
    },

    /// Delete keys matching a glob pattern
    Purge { pattern: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, variables may come from the shell
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing_with(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Tools => list_tools(),
        Commands::Run { tool, params, json } => run_tool(&tool, &params, json).await,
        Commands::CheckEnv => check_env(),
        Commands::Cache { command } => cache_command(command).await,
    }
}

fn list_tools() -> anyhow::Result<()> {
    let config = MarketConfig::from_env()?;
    // Listing never touches the network, so skip connecting to Redis
    let market = MarketData::new(
        FmpClient::from_config(&config)?,
        CacheLayer::unavailable(config.cache.version.clone()),
    );
    let registry = default_registry(Arc::new(market), &config)?;

    let mut definitions = registry.definitions();
    definitions.sort_by(|a, b| a.name.cmp(&b.name));
    println!("{}", render::tools_table(&definitions));
    Ok(())
}

async fn run_tool(tool: &str, params: &str, as_json: bool) -> anyhow::Result<()> {
    let params: Value = serde_json::from_str(params).context("--params must be a JSON object")?;
    if !params.is_object() {
        bail!("--params must be a JSON object");
    }

    let config = MarketConfig::from_env()?;
    debug!(?config, "Loaded configuration");

    let market = Arc::new(MarketData::from_config(&config).await?);
    let registry = default_registry(Arc::clone(&market), &config)?;

    info!(tool, "Running tool");
    let output = registry.execute(tool, params).await?;

    let stats = market.cache().stats();
    debug!(
        hits = stats.hits,
        misses = stats.misses,
        writes = stats.writes,
        hit_rate = stats.hit_rate(),
        "Cache statistics"
    );

    render::print_tool_output(&output, as_json)
}

fn check_env() -> anyhow::Result<()> {
    let statuses = check_environment(agent_market::config::ENV_REQUIREMENTS);
    println!("{}", render::env_table(&statuses));

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| s.is_blocking())
        .map(|s| s.requirement.name)
        .collect();
    if !missing.is_empty() {
        bail!("required variables not set: {}", missing.join(", "));
    }
    Ok(())
}

async fn cache_command(command: CacheCommand) -> anyhow::Result<()> {
    let config = CacheConfig::from_env()?;
    let store = RedisStore::connect(&config)
        .await
        .with_context(|| format!("cache unavailable at {}", config.url()))?;

    match command {
        CacheCommand::Ping => {
            store.ping().await?;
            println!("PONG from {}", store.url());
        }
        CacheCommand::Keys { pattern } => {
            let keys = store.keys(&pattern).await?;
            for key in &keys {
                println!("{key}");
            }
            info!(pattern, count = keys.len(), "Listed keys");
        }
        CacheCommand::Purge { pattern } => {
            if pattern.trim().is_empty() {
                bail!("refusing to purge with an empty pattern");
            }
            let deleted = store.delete_pattern(&pattern).await?;
            println!("Deleted {deleted} keys matching {pattern}");
        }
    }
    Ok(())
}
