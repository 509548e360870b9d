//! CLI module - argument parsing and command dispatch
//!
//! Commands:
//! - `chat` (default): interactive coaching session
//! - `sessions`: list stored conversations
//! - `status`: probe the model endpoint and both fitness APIs
//! - `plan`: draft and apply a readiness-adjusted routine update

mod chat;
mod plan;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::clients::{FitbitClient, HevyClient};
use crate::config::Config;
use crate::providers::{LLMProvider, OpenAiCompatProvider};
use crate::session::SessionStore;
use crate::tools::{RecentWorkoutsTool, RoutineDetailsTool, TodaysReadinessTool, ToolRegistry};

#[derive(Parser, Debug)]
#[command(
    name = "fitcoach",
    version,
    about = "Personal AI strength & conditioning coach for Hevy and Fitbit data"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the coach (default when no command is given)
    Chat {
        /// Resume an existing session by id instead of starting a new one
        #[arg(long)]
        session: Option<String>,
    },
    /// List stored chat sessions, newest first
    Sessions,
    /// Check connectivity to the model endpoint, Hevy, and Fitbit
    Status,
    /// Draft a readiness-adjusted update for a Hevy routine and apply it
    Plan {
        /// Routine to adjust, matched by name substring; defaults to the first routine
        #[arg(long)]
        routine: Option<String>,
        /// Apply the update without asking for confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// Binary entry point: parse arguments, load config, dispatch.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Chat { session: None }) {
        Command::Chat { session } => chat::run(config, session).await,
        Command::Sessions => sessions(&config).await,
        Command::Status => status(&config).await,
        Command::Plan { routine, yes } => plan::run(config, routine, yes).await,
    }
}

pub(crate) fn hevy_client(config: &Config) -> Option<Arc<HevyClient>> {
    config
        .hevy_api_key
        .as_deref()
        .map(|key| Arc::new(HevyClient::new(key)))
}

pub(crate) fn fitbit_client(config: &Config) -> Option<Arc<FitbitClient>> {
    config
        .fitbit_access_token
        .as_deref()
        .map(|token| Arc::new(FitbitClient::new(token)))
}

/// Build the tool registry from whatever credentials are available.
///
/// Missing credentials disable the matching tools rather than failing:
/// the coach still chats, it just cannot see that data source.
pub(crate) fn build_registry(config: &Config) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    match hevy_client(config) {
        Some(hevy) => {
            registry.register(Box::new(RecentWorkoutsTool::new(hevy.clone())));
            registry.register(Box::new(RoutineDetailsTool::new(hevy)));
        }
        None => warn!("HEVY_API_KEY not set, workout tools disabled"),
    }
    match fitbit_client(config) {
        Some(fitbit) => registry.register(Box::new(TodaysReadinessTool::new(fitbit))),
        None => warn!("FITBIT_ACCESS_TOKEN not set, readiness tool disabled"),
    }

    registry
}

async fn sessions(config: &Config) -> anyhow::Result<()> {
    let store = SessionStore::open(&config.db_path).await?;
    let sessions = store.list_sessions().await?;

    if sessions.is_empty() {
        println!("No sessions yet. Run `fitcoach chat` to start one.");
        return Ok(());
    }
    for session in sessions {
        println!(
            "{}  {}  {}",
            session.id,
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.title
        );
    }
    Ok(())
}

async fn status(config: &Config) -> anyhow::Result<()> {
    let provider = OpenAiCompatProvider::new(&config.llm);
    let hevy = hevy_client(config);
    let fitbit = fitbit_client(config);

    let hevy_probe = async {
        match &hevy {
            Some(client) => state_label(client.check_connection().await),
            None => "not configured",
        }
    };
    let fitbit_probe = async {
        match &fitbit {
            Some(client) => state_label(client.check_connection().await),
            None => "not configured",
        }
    };
    let (model_ok, hevy_state, fitbit_state) =
        futures::join!(provider.health_check(), hevy_probe, fitbit_probe);

    println!("model   {}  ({})", state_label(model_ok), config.llm.model);
    println!("hevy    {}", hevy_state);
    println!("fitbit  {}", fitbit_state);
    Ok(())
}

fn state_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "unreachable"
    }
}
