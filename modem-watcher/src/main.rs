// SPDX-License-Identifier: GPL-3.0-only

//! Modem watcher - logs ModemManager presence and modem add/remove events.
//!
//! Event lines go to stdout with a `[ModemWatcher]` prefix; diagnostics go to
//! stderr via tracing so the two never interleave.

use anyhow::Result;
use futures::StreamExt;
use tracing_subscriber::{EnvFilter, fmt};

mod report;

use modem_dbus::ModemManagerClient;
use report::Reporter;

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("modem_watcher=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting modem watcher v{}", env!("CARGO_PKG_VERSION"));

    let client = ModemManagerClient::new().await?;
    let mut events = client.watch().await?;
    let mut reporter = Reporter::new(std::io::stdout());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
            event = events.next() => match event {
                Some(event) => reporter.handle(&event)?,
                None => {
                    tracing::warn!("Bus connection lost, exiting");
                    break;
                }
            }
        }
    }

    Ok(())
}
