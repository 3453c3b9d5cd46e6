//! Tally daemon: entry point for running the vote ledger service.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tally_crypto::{AuditSalt, SharedSecret};
use tally_ledger::VoteLedger;
use tally_rpc::{AppState, RateLimiter, RpcMetrics, RpcServer};
use tally_store_lmdb::environment::DEFAULT_MAX_DBS;
use tally_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use tally_utils::{init_logging, LogFormat};
use zeroize::Zeroizing;

use crate::config::TallyConfig;

#[derive(Parser)]
#[command(name = "tally-daemon", about = "Poll vote ledger with a tamper-evident audit chain")]
struct Cli {
    /// Directory holding the ledger databases.
    #[arg(long, env = "TALLY_DATA_DIR")]
    data_dir: PathBuf,

    /// Ledger namespace: a sub-directory of the data directory.
    #[arg(long, default_value = "pollsDB", env = "TALLY_DB_NAME")]
    db_name: String,

    /// Secret salt mixed into every audit hash. Required.
    #[arg(long, env = "TALLY_AUDIT_SALT", hide_env_values = true)]
    audit_salt: Option<String>,

    /// Pre-shared key for the admin routes. Without it they always answer 403.
    #[arg(long, env = "TALLY_ADMIN_KEY", hide_env_values = true)]
    admin_key: Option<String>,

    /// HTTP port (overrides the config file).
    #[arg(long, env = "TALLY_PORT")]
    port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Verify the audit chain offline and exit.
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => TallyConfig::from_toml_file(path)?,
        None => TallyConfig::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(level) = cli.log_level.take() {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    init_logging(config.log_format, &config.log_level);

    let salt = Zeroizing::new(cli.audit_salt.take().unwrap_or_default());
    let Some(salt) = AuditSalt::new(salt.as_bytes()) else {
        bail!("TALLY_AUDIT_SALT (or --audit-salt) must be set to a non-empty value");
    };
    let admin_key = Zeroizing::new(cli.admin_key.take().unwrap_or_default());
    let admin_key = SharedSecret::new(admin_key.as_bytes());
    if admin_key.is_none() {
        tracing::warn!("no admin key configured; admin routes will refuse every request");
    }

    let path = cli.data_dir.join(&cli.db_name);
    let env = open_ledger_env(&path, &config)?;
    let ledger = VoteLedger::with_config(env, salt, config.ledger_config());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Verify => {
            let report = ledger
                .verify_chain()
                .context("audit chain verification failed")?;
            tracing::info!(
                entries = report.entries,
                head = %report.head_hash.map(|h| h.to_hex()).unwrap_or_default(),
                "audit chain intact"
            );
        }
        Command::Serve => {
            let limiter = RateLimiter::new(config.results_quota, config.results_window());
            let metrics = RpcMetrics::new().context("registering metrics")?;
            let state = AppState::new(ledger, admin_key, limiter, metrics)
                .trust_forwarded_for(config.trust_forwarded_for);

            tracing::info!(
                port = config.port,
                data = %path.display(),
                threshold = config.disclosure_threshold,
                "starting tally daemon"
            );
            RpcServer::new(config.port, state)
                .start(shutdown_signal())
                .await
                .context("HTTP server failed")?;
            tracing::info!("tally daemon exited cleanly");
        }
    }

    Ok(())
}

/// Open the LMDB environment and refuse to continue if it looks damaged.
fn open_ledger_env(path: &Path, config: &TallyConfig) -> anyhow::Result<LmdbEnvironment> {
    check_data_dir(path).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(path, DEFAULT_MAX_DBS, config.map_size_bytes())
        .with_context(|| format!("opening ledger at {}", path.display()))?;

    let report = check_integrity(&env).context("running integrity check")?;
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::error!(%error, "integrity check");
        }
        bail!(
            "ledger at {} failed its integrity check ({} problems)",
            path.display(),
            report.errors.len()
        );
    }
    tracing::info!(
        votes = report.vote_count,
        audit_entries = report.audit_count,
        "ledger opened"
    );
    Ok(env)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining requests");
}
