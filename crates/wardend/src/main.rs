use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serenity::all::{ApplicationId, GatewayIntents};
use serenity::Client;
use songbird::SerenityInit;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use warden_core::{BotCommand, BotConfig, DEFAULT_CONFIG_PATH};

mod handler;
mod interaction;
mod state;

use handler::Handler;
use state::BotState;

#[derive(Parser, Debug)]
#[command(name = "wardend", version, about = "Warden guild moderation bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[arg(long, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "GUILD_ID")]
    guild_id: Option<u64>,

    #[arg(long, env = "CLIENT_ID")]
    application_id: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate the config file, then print a summary.
    Check,
    /// List the slash commands the bot registers.
    Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = BotConfig::load(&cli.config)
        .with_context(|| format!("load config {}", cli.config.display()))?;
    if cli.guild_id.is_some() {
        config.guild_id = cli.guild_id;
    }

    match &cli.command {
        Some(Commands::Check) => {
            print_summary(&config);
            return Ok(());
        }
        Some(Commands::Commands) => {
            for cmd in BotCommand::ALL {
                println!("/{} - {}", cmd.name(), cmd.description());
            }
            return Ok(());
        }
        None => {}
    }

    let token = cli.token.clone().context("--token or TOKEN is required")?;
    run(config, token, cli.application_id).await
}

async fn run(config: BotConfig, token: String, application_id: Option<u64>) -> Result<()> {
    let state = Arc::new(BotState::new(config)?);
    let sweeper = state::spawn_sweeper(state.clone());

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut builder = Client::builder(&token, intents)
        .event_handler(Handler::new(state.clone()))
        .register_songbird();
    if let Some(id) = application_id {
        builder = builder.application_id(ApplicationId::new(id));
    }
    let mut client = builder.await.context("build gateway client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shard_manager.shutdown_all().await;
        }
    });

    info!(
        window_ms = state.moderator.counter().config().window_ms(),
        threshold = state.moderator.counter().config().threshold(),
        "starting bot"
    );
    let result = client.start().await;
    if let Some(task) = sweeper {
        task.abort();
    }
    if let Err(err) = &result {
        error!(%err, "gateway client stopped");
    }
    result.context("run gateway client")
}

fn print_summary(config: &BotConfig) {
    let guild = config
        .guild_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".into());
    println!("config ok");
    println!("guild_id={guild}");
    println!("auto_role={}", config.auto_role);
    println!(
        "anti_spam window_ms={} threshold={} reset_after_action={} sweep_interval_secs={}",
        config.anti_spam.window_ms,
        config.anti_spam.threshold,
        config.anti_spam.reset_after_action,
        config.anti_spam.sweep_interval_secs
    );
    println!("danger_keywords={}", config.danger_keywords.join(","));
}
