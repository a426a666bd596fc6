//! # Ferrous Chain
//!
//! DNS server whose zones are served by configurable middleware chains.

use clap::Parser;
use ferrous_chain_domain::CliOverrides;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-chain")]
#[command(version)]
#[command(about = "Ferrous Chain - pluggable DNS server built from middleware chains")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level or filter (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = cli.config.as_deref().unwrap_or("default"),
        dns_port = config.server.dns_port,
        bind = %config.server.bind_address,
        zones = config.zones.len(),
        "Starting Ferrous Chain"
    );

    let dns_services = di::DnsServices::new(&config)?;
    let shutdown = CancellationToken::new();

    let sweepers = if config.cache.sweep_interval_secs > 0 {
        dns_services.start_sweepers(
            Duration::from_secs(config.cache.sweep_interval_secs),
            &shutdown,
        )
    } else {
        Vec::new()
    };

    let mut dns_server = tokio::spawn(server::start_dns_server(
        config.server.clone(),
        Arc::clone(&dns_services.router),
        shutdown.clone(),
    ));

    let result = tokio::select! {
        result = &mut dns_server => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            shutdown.cancel();
            dns_server.await
        }
    };
    shutdown.cancel();

    for sweeper in sweepers {
        let _ = sweeper.await;
    }

    match result {
        Ok(Ok(())) => {
            info!(
                responses = dns_services.metrics.total_responses(),
                "Server shutdown complete"
            );
            Ok(())
        }
        Ok(Err(e)) => {
            error!(error = %e, "DNS server error");
            Err(e)
        }
        Err(e) => Err(e.into()),
    }
}
