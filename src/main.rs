//! dev-proxy: development proxy server for the front-end app.
//!
//! Resolves the configuration descriptor for a mode and either runs the dev
//! server (`serve`) or prints the descriptor as JSON (`resolve`).

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use dev_proxy::config::{validate_descriptor, ConfigDescriptor, ConfigError};
use dev_proxy::env::{load_env, EnvSnapshot};
use dev_proxy::http::DevServer;
use dev_proxy::observability::{logging, metrics};
use dev_proxy::proxy::TracingObserver;

#[derive(Parser)]
#[command(name = "dev-proxy")]
#[command(about = "Development proxy server for the front-end app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve configuration and run the dev server
    Serve {
        /// Build mode selecting the environment profile
        #[arg(short, long, default_value = "development", value_parser = parse_mode)]
        mode: String,

        /// Expose Prometheus metrics
        #[arg(long)]
        metrics: bool,

        /// Metrics exporter bind address
        #[arg(long, default_value = "127.0.0.1:9090")]
        metrics_address: String,
    },
    /// Print the resolved configuration descriptor as JSON
    Resolve {
        /// Build mode selecting the environment profile
        #[arg(short, long, default_value = "development", value_parser = parse_mode)]
        mode: String,
    },
}

/// Modes select an environment profile; an empty one is always a mistake.
fn parse_mode(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        Err("mode must be a non-empty string".to_string())
    } else {
        Ok(raw.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            mode,
            metrics,
            metrics_address,
        } => serve(&mode, metrics, &metrics_address).await,
        Commands::Resolve { mode } => {
            let descriptor = resolve_descriptor(&mode)?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
            Ok(())
        }
    }
}

/// Load the environment for `mode`, resolve, and validate the descriptor.
fn resolve_descriptor(mode: &str) -> Result<ConfigDescriptor, Box<dyn std::error::Error>> {
    let root = std::env::current_dir()?;
    let process = EnvSnapshot::from_process();
    let env = load_env(mode, &root, &process)?;

    let descriptor = dev_proxy::config::resolve(mode, &env, &root);
    validate_descriptor(&descriptor).map_err(ConfigError::Validation)?;
    Ok(descriptor)
}

async fn serve(
    mode: &str,
    metrics_enabled: bool,
    metrics_address: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    tracing::info!("dev-proxy v0.1.0 starting");

    let descriptor = resolve_descriptor(mode)?;

    tracing::info!(
        mode = %descriptor.mode,
        bind_address = %descriptor.server.bind_address(),
        rules = descriptor.rules.len(),
        defines = descriptor.defines.len(),
        "Configuration resolved"
    );

    if metrics_enabled {
        if let Ok(addr) = metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(descriptor.server.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = DevServer::new(descriptor, Arc::new(TracingObserver));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
