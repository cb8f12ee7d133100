//! Task Relay server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use task_relay::config::{AppConfig, DEFAULT_GITHUB_USERNAME};
use task_relay::server::{run_server, AppState};

#[derive(Parser, Debug)]
#[command(name = "task-relay")]
#[command(about = "Webhook-triggered task publisher")]
struct Args {
    /// Shared secret inbound requests must present
    #[arg(long, env = "STUDENT_SECRET")]
    student_secret: String,

    /// Access token for pushing to task repositories
    #[arg(long, env = "GITHUB_TOKEN", default_value = "")]
    github_token: String,

    /// Account owning the task repositories
    #[arg(long, env = "GITHUB_USERNAME", default_value = DEFAULT_GITHUB_USERNAME)]
    github_username: String,

    /// Generative API key; accepted for deployment parity, unused
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,

    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "RELAY_HOST")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8000", env = "RELAY_PORT")]
    port: u16,

    /// Root directory for per-task working copies
    #[arg(long, default_value = "generated_tasks", env = "TASKS_ROOT")]
    tasks_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("task_relay=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    info!("Starting Task Relay");
    info!("  Account: {}", args.github_username);
    info!("  Tasks root: {}", args.tasks_root.display());
    info!("  Listening on: {}:{}", args.host, args.port);
    if args.gemini_api_key.is_some() {
        debug!("GEMINI_API_KEY is set (not used by the pipeline)");
    }

    std::fs::create_dir_all(&args.tasks_root)?;

    let config = AppConfig {
        student_secret: args.student_secret,
        github_token: args.github_token,
        github_username: args.github_username,
        gemini_api_key: args.gemini_api_key,
        tasks_root: args.tasks_root,
    };

    let state = Arc::new(AppState::new(config));
    run_server(state, &args.host, args.port).await
}
