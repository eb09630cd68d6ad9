//! Dashboard server entry point.
//!
//! # Responsibility
//! - Parse flags, initialize logging, build the dashboard and serve it.
//! - Drain in-flight requests on Ctrl-C / SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use flexpane_core::{default_log_level, init_logging, Dashboard, DashboardConfig};
use flexpane_server::{build_router, AppState};
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "flexpane", version, about = "Personal dashboard server")]
struct Cli {
    /// Dashboard configuration file; built-in demo defaults apply when absent.
    #[arg(long, default_value = "config/dashboard.json")]
    config: PathBuf,

    /// Full listen address; overrides `--port`.
    #[arg(long)]
    bind: Option<SocketAddr>,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Write rotating log files here instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let config = DashboardConfig::load(&cli.config)
        .with_context(|| format!("failed to load config `{}`", cli.config.display()))?;
    let dashboard = Dashboard::build(&config).context("failed to build dashboard")?;
    let app = build_router(Arc::new(AppState::from_dashboard(dashboard)));

    let addr = cli
        .bind
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], cli.port)));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("event=server_start module=server status=ok addr={addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server error")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                warn!("event=signal_register module=server status=error signal=SIGTERM error={err}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("event=shutdown_signal module=server status=ok");
}
