//! vaultlock - auto-lock checks for an encrypted vault session
//!
//! This is the main entry point for the vaultlock command.
//! It wires together all the components:
//! - Configuration loading
//! - Session store initialization
//! - System log access (macOS)
//! - The lock decision engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vaultlock_api::{ProbeResult, SystemEvent, TimeoutPolicy};
use vaultlock_config::{load_config_or_default, parse_timeout_str, Config};
use vaultlock_core::{SessionGuard, SystemActivityProbe};
use vaultlock_host_macos::SyslogQuery;
use vaultlock_store::{SqliteStore, Store};
use vaultlock_util::{
    default_config_path, format_datetime_full, format_timestamp, is_mock_time_active, now,
    SESSION_DB_FILENAME,
};

/// vaultlock - decide whether a vault session must be locked
#[derive(Parser, Debug)]
#[command(name = "vaultlock")]
#[command(about = "Auto-lock decisions for an encrypted vault session", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/vaultlock/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set VAULTLOCK_DATA_DIR env var)
    #[arg(short, long, env = "VAULTLOCK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Timeout policy override: never, immediately, system_lock, system_sleep, or milliseconds
    #[arg(short, long)]
    timeout: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Evaluate the saved session and print the lock decision
    Check {
        /// Clear the session and record the lock reason when locking
        #[arg(long)]
        apply: bool,
    },
    /// Save a session after a successful unlock
    Save {
        #[arg(long)]
        token: String,
        #[arg(long)]
        hash: String,
    },
    /// Reset the inactivity window
    Touch,
    /// Remove the saved credentials
    Clear,
    /// Remove everything related to the session
    Logout,
    /// Print the reason for the last recorded lock
    Reason {
        /// Remove the reason after printing it
        #[arg(long)]
        take: bool,
    },
    /// Look up the most recent system event
    Probe {
        #[arg(value_enum)]
        event: EventArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EventArg {
    Lock,
    Sleep,
}

impl From<EventArg> for SystemEvent {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Lock => SystemEvent::ScreenUnlock,
            EventArg::Sleep => SystemEvent::Sleep,
        }
    }
}

/// Command state
struct App {
    policy: TimeoutPolicy,
    query: Arc<SyslogQuery>,
    guard: SessionGuard,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let config: Config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        let policy = match &args.timeout {
            Some(value) => parse_timeout_str(value)?,
            None => config.vault.timeout,
        };

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| config.vault.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(SESSION_DB_FILENAME);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        if !store.is_healthy() {
            anyhow::bail!("Session store at {:?} is not usable", db_path);
        }

        debug!(db_path = %db_path.display(), policy = %policy, "Session store opened");

        let query = Arc::new(SyslogQuery::new());
        let guard = SessionGuard::new(store, query.clone());

        Ok(Self {
            policy,
            query,
            guard,
        })
    }

    async fn run(self, command: Cmd) -> Result<()> {
        let lifecycle = self.guard.lifecycle();

        match command {
            Cmd::Check { apply } => {
                let saved = self.guard.check(self.policy, now()).await;
                let decision = saved.decision;

                if apply && decision.should_lock {
                    match decision.reason {
                        Some(reason) => lifecycle.record_lock(reason)?,
                        None => lifecycle.clear()?,
                    }
                }

                print_json(&json!({
                    "policy": self.policy.to_string(),
                    "should_lock": decision.should_lock,
                    "reason": decision.reason,
                    "message": decision.reason.map(|r| r.message()),
                    "last_activity_time": saved.record.last_activity_time.as_ref().map(format_timestamp),
                }))
            }
            Cmd::Save { token, hash } => {
                lifecycle.save(&token, &hash)?;
                lifecycle.touch(now())?;
                Ok(())
            }
            Cmd::Touch => Ok(lifecycle.touch(now())?),
            Cmd::Clear => Ok(lifecycle.clear()?),
            Cmd::Logout => Ok(lifecycle.full_logout_clear()?),
            Cmd::Reason { take } => {
                let reason = if take {
                    lifecycle.take_lock_reason()?
                } else {
                    lifecycle.lock_reason()?
                };
                print_json(&json!({
                    "reason": reason,
                    "message": reason.map(|r| r.message()),
                }))
            }
            Cmd::Probe { event } => {
                let event = SystemEvent::from(event);
                let probe = SystemActivityProbe::new(self.query.clone());
                let result = probe.find_last_event(event.log_filter()).await;
                let at = match result {
                    ProbeResult::Found(at) => Some(format_datetime_full(&at)),
                    ProbeResult::Unknown => None,
                };
                print_json(&json!({ "event": event, "result": result, "at": at }))
            }
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mock_time = is_mock_time_active(),
        "vaultlock starting"
    );

    let app = App::new(&args)?;
    app.run(args.command).await
}
