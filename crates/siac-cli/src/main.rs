//! Console front end for the SI-card battery monitor.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use siac_core::constants::DEFAULT_CLEAR_AFTER_MS;
use siac_hardware::DeviceEndpoint;
use tracing_subscriber::EnvFilter;

mod console;
mod demo;

#[derive(Parser)]
#[command(name = "siac")]
#[command(about = "SI-card battery monitor", version = siac_core::VERSION, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List SI reading stations attached to this host
    Ports {
        /// Print the endpoints as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a scripted readout session against a simulated station
    Demo {
        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,

        /// Delay before verdicts are cleared, in milliseconds
        #[arg(long, default_value_t = DEFAULT_CLEAR_AFTER_MS)]
        clear_after_ms: u64,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "hardware-serial")]
fn list_ports() -> Result<Vec<DeviceEndpoint>> {
    use siac_hardware::serial::SerialPortEnumerator;

    Ok(SerialPortEnumerator::new().try_list_endpoints()?)
}

#[cfg(not(feature = "hardware-serial"))]
fn list_ports() -> Result<Vec<DeviceEndpoint>> {
    tracing::warn!("Built without serial port support (feature `hardware-serial`)");
    Ok(Vec::new())
}

fn print_ports(json: bool) -> Result<()> {
    let endpoints = list_ports()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&endpoints)?);
    } else if endpoints.is_empty() {
        println!("No reading device found");
    } else {
        for endpoint in &endpoints {
            println!("[{}] {}", endpoint.id, endpoint);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ports { json } => print_ports(json)?,
        Commands::Demo {
            json,
            clear_after_ms,
        } => demo::run(json, Duration::from_millis(clear_after_ms)).await?,
    }

    Ok(())
}
