//! hostmond - host metrics collection agent.
//!
//! Samples disk, CPU and filesystem counters from /proc on a fixed interval,
//! converts counter deltas to rates, exposes everything on a Prometheus
//! /metrics endpoint and evaluates three-tier threshold alerts.

mod background;
mod handlers;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use hostmon_core::collector::Collector;
use hostmon_core::config::AlertConfig;

use state::{AgentInner, SharedState};

// ============================================================
// CLI
// ============================================================

/// Host metrics collection agent.
#[derive(Parser)]
#[command(name = "hostmond", about = "Host metrics collection agent", version = hostmon_core::VERSION)]
struct Args {
    /// Listen address for the metrics endpoint.
    #[arg(long, default_value = "0.0.0.0:8999", env = "HOSTMON_LISTEN")]
    listen: String,

    /// Collection interval in seconds.
    #[arg(short, long, default_value = "10", env = "HOSTMON_INTERVAL")]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to the alert threshold configuration (JSON).
    #[arg(short, long, env = "HOSTMON_CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hostmond={}", level).parse().unwrap())
        .add_directive(format!("hostmon_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async_main(args));
}

async fn async_main(args: Args) {
    info!("hostmond {} starting", hostmon_core::VERSION);
    info!(
        "Config: interval={}s, listen={}, proc={}",
        args.interval, args.listen, args.proc_path
    );

    let config = match args.config {
        Some(ref path) => AlertConfig::load(path),
        None => AlertConfig::default(),
    };
    if config.thresholds.is_empty() {
        info!("no alert thresholds configured, every measurement classifies as clean");
    } else {
        info!(
            entities = config.thresholds.len(),
            "alert thresholds loaded"
        );
    }

    let collector = create_collector(&args);
    let inner = AgentInner::new(collector, config.thresholds);
    let state: SharedState = Arc::new(Mutex::new(inner));

    let interval = Duration::from_secs(args.interval.max(1));
    tokio::spawn(background::tick_loop(state.clone(), interval));

    let app = Router::new()
        .route("/metrics", get(handlers::handle_metrics))
        .route("/api/v1/health", get(handlers::handle_health))
        .route("/api/v1/status", get(handlers::handle_status))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let addr: SocketAddr = args.listen.parse().expect("invalid listen address");
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("shutdown complete");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received shutdown signal");
}

fn create_collector(args: &Args) -> Collector<state::AgentFs> {
    #[cfg(target_os = "linux")]
    {
        Collector::new(hostmon_core::collector::RealFs::new(), &args.proc_path)
    }
    #[cfg(not(target_os = "linux"))]
    {
        Collector::new(
            hostmon_core::collector::MockFs::typical_system(),
            &args.proc_path,
        )
    }
}
