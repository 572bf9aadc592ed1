//! Demo firmware host.
//!
//! Runs the driver runtime against a simulated UART: starts the autostart
//! drivers, drives the once-per-second and quick ticks from tokio
//! intervals, feeds stdin lines through the debug console, and shuts every
//! driver down on ctrl-c.
//!
//! ```bash
//! driver-hub --config config/device.toml
//! > startDriver TestPower
//! > uartInit 115200
//! > uartFakeHex 55 AA 00 05
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use driver_hub::config::Settings;
use driver_hub::console::{Console, MapConstants};
use driver_hub::drivers::builtin_drivers;
use driver_hub::registry::DriverRegistry;
use driver_hub::scheduler::TickScheduler;
use driver_hub::serial::{SimUart, UartService};
use driver_hub::status::StatusPage;
use driver_hub::telemetry::{self, OutputFormat};

#[derive(Parser)]
#[command(name = "driver-hub")]
#[command(about = "Driver runtime demo host with a simulated UART", long_about = None)]
struct Cli {
    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured log filter
    #[arg(long)]
    log_level: Option<String>,

    /// Use compact single-line log output
    #[arg(long)]
    compact_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let filter = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    let format = if cli.compact_logs {
        OutputFormat::Compact
    } else {
        OutputFormat::Pretty
    };
    telemetry::init(filter, format).context("initializing telemetry")?;

    let registry = Arc::new(
        DriverRegistry::new(builtin_drivers())
            .context("building driver table")?
            .with_lock_timeout(settings.scheduler.lock_timeout),
    );
    let scheduler = TickScheduler::new(Arc::clone(&registry));

    let uart = Arc::new(UartService::new(Box::new(SimUart::new())));
    uart.reconfigure(settings.uart.baud)
        .context("configuring uart")?;
    uart.init_rx_ring(settings.uart.rx_buffer);

    info!(
        drivers = %registry.driver_names().join(", "),
        "driver table ready"
    );
    for name in &settings.autostart {
        registry.start(name);
    }

    let console = Console::new(
        Arc::clone(&registry),
        Arc::clone(&uart),
        Box::new(MapConstants::new()),
    );

    // Once-per-second tick: driver dispatch plus the UART debug drain.
    let second_scheduler = TickScheduler::new(Arc::clone(&registry));
    let second_uart = Arc::clone(&uart);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            interval.tick().await;
            second_scheduler.tick_second();
            second_uart.run_every_second();
        }
    });

    // Quick tick: zero-wait dispatch for latency-sensitive drivers.
    let quick_period = settings.scheduler.quick_tick;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(quick_period);
        loop {
            interval.tick().await;
            scheduler.quick_tick();
        }
    });

    // Console: stdin lines through the command surface.
    let status_scheduler = TickScheduler::new(Arc::clone(&registry));
    let stdin_loop = async {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case("status") {
                let mut page = StatusPage::new();
                status_scheduler.append_status(&mut page);
                println!("{}", page.as_str());
                continue;
            }
            if let Err(err) = console.dispatch(trimmed) {
                error!(%err, line = trimmed, "command failed");
            }
        }
    };

    tokio::select! {
        _ = stdin_loop => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }
    registry.shutdown_all();
    Ok(())
}
