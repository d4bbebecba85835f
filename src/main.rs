//! Instrumented task-processing services (v1)
//!
//! One binary, two services. Both share the same instrumentation pipeline
//! and differ only in the routes they mount.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  SERVICE                     │
//!                      │                                              │
//!     Client Request   │  ┌──────────┐   ┌──────────────┐   ┌───────┐ │
//!     ─────────────────┼─▶│ request  │──▶│ instrument   │──▶│handler│ │
//!                      │  │   id     │   │ (metrics,    │   └───┬───┘ │
//!                      │  └──────────┘   │  log, span)  │       │     │
//!                      │                 └──────────────┘       ▼     │
//!                      │                              ┌───────────────┐│
//!                      │                              │ items (api)   ││
//!                      │                              │ tasks (worker)││
//!                      │                              └───────┬───────┘│
//!                      │                                      │        │
//!                      │                      background mode ▼        │
//!                      │                              ┌───────────────┐│
//!                      │                              │  task worker  ││
//!                      │                              └───────────────┘│
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use devops_services::config::{read_config, validate_config, ServiceConfig, ServiceKind};
use devops_services::http::HttpServer;
use devops_services::lifecycle::{signals, Shutdown};
use devops_services::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "devops-services")]
#[command(about = "Instrumented API and worker services", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the item API service
    Api,
    /// Run the task worker service
    Worker,
}

impl Commands {
    fn kind(&self) -> ServiceKind {
        match self {
            Commands::Api => ServiceKind::Api,
            Commands::Worker => ServiceKind::Worker,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let kind = cli.command.kind();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ServiceConfig::for_service(kind),
    };
    config.service = kind;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = Some(bind);
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("invalid configuration: {}", error);
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    init_logging(&config.observability)?;

    tracing::info!(
        service = config.service_name(),
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );
    tracing::info!(
        bind_address = config.bind_address(),
        request_timeout_secs = config.timeouts.request_secs,
        task_mode = ?config.tasks.mode,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
