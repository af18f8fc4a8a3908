//! HAProxy member reconciliation CLI.
//!
//! Brings one backend server into the `enabled` or `disabled` state through
//! the runtime admin socket, optionally setting its weight. Safe to repeat;
//! `--check` previews without sending any mutating command.
//!
//! ```text
//!   args ─▶ ReconcileRequest ─▶ ReconcileEngine ─▶ SocketTransport ─▶ haproxy.sock
//!                                     │
//!                                     ▼
//!                        stdout: {"changed": .., "stdout": ..}
//! ```
//!
//! The stats socket must be configured with `level admin`, e.g.
//! `stats socket /var/run/haproxy.sock level admin`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use serde_json::json;

use haproxy_reconcile::config::loader::load_config;
use haproxy_reconcile::observability::init_logging;
use haproxy_reconcile::{
    AppConfig, DesiredState, ReconcileEngine, ReconcileRequest, SocketTransport, WeightExpr,
};

#[derive(Parser)]
#[command(name = "haproxy-reconcile")]
#[command(about = "Enable or disable a HAProxy backend server via the admin socket", long_about = None)]
struct Cli {
    /// Desired state of the server in its backend pool (enabled, disabled).
    #[arg(long)]
    state: String,

    /// Server name as it appears in the backend.
    #[arg(long)]
    host: String,

    /// Backend pool name. Auto-detected from `show stat` when omitted.
    #[arg(long)]
    backend: Option<String>,

    /// Absolute weight (0-256) or relative weight (0%-100%).
    #[arg(long)]
    weight: Option<String>,

    /// Admin socket path [default: /var/run/haproxy.sock].
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Terminate the server's sessions after disabling it.
    #[arg(long)]
    shutdown_sessions: bool,

    /// Report what would change without sending mutating commands.
    #[arg(long, alias = "dry-run")]
    check: bool,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bound each socket round trip, in seconds.
    #[arg(long)]
    read_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return fail(e.to_string().trim().to_string()),
    };

    // Usage errors are reported before any socket activity.
    let state: DesiredState = match cli.state.parse() {
        Ok(state) => state,
        Err(e) => return fail(e.to_string()),
    };
    let weight = match cli
        .weight
        .as_deref()
        .map(str::parse::<WeightExpr>)
        .transpose()
    {
        Ok(weight) => weight,
        Err(e) => return fail(e.to_string()),
    };

    let mut config = match cli.config.as_deref() {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => return fail(format!("failed to load {}: {}", path.display(), e)),
        },
        None => AppConfig::default(),
    };
    if let Some(socket) = &cli.socket {
        config.admin.socket_path = socket.display().to_string();
    }
    if let Some(secs) = cli.read_timeout {
        config.admin.read_timeout_secs = Some(secs);
    }

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("logging already initialized: {}", e);
    }

    let mut request = ReconcileRequest::new(state, cli.host)
        .with_shutdown_sessions(cli.shutdown_sessions)
        .with_dry_run(cli.check);
    if let Some(backend) = cli.backend {
        request = request.with_backend(backend);
    }
    if let Some(weight) = weight {
        request = request.with_weight(weight);
    }

    tracing::debug!(
        socket = %config.admin.socket_path,
        read_timeout_secs = ?config.admin.read_timeout_secs,
        "Configuration loaded"
    );

    let transport = SocketTransport::new(&config.admin.socket_path)
        .with_read_timeout(config.admin.read_timeout());
    let engine = ReconcileEngine::new(transport);

    match engine.reconcile(&request).await {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(body) => {
                println!("{}", body);
                ExitCode::SUCCESS
            }
            Err(e) => fail(e.to_string()),
        },
        Err(e) => {
            tracing::error!(error = %e, "Reconciliation failed");
            fail(e.to_string())
        }
    }
}

fn fail(msg: String) -> ExitCode {
    println!("{}", json!({ "failed": true, "msg": msg }));
    ExitCode::FAILURE
}
