//! # pkoned — PKONE platform daemon
//!
//! Composition root that wires the PKONE platform to a byte stream and runs
//! it until the link closes or the process is interrupted.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Register the configured boards
//! - Connect the command sink to stdout and the frame reader to stdin
//! - Run the heartbeat watchdog
//! - Reset the boards on shutdown (SIGINT or end of input)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use pkone_adapter_stream::{FrameReader, StreamCommandSink, forward_frames};
use pkone_app::event_bus::InProcessSwitchBus;
use pkone_app::services::platform_service::PlatformService;
use pkone_domain::error::PkoneError;
use tokio::sync::broadcast::error::RecvError;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Logs go to stderr; stdout carries the command stream.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    // Switch events
    let bus = Arc::new(InProcessSwitchBus::new(config.platform.event_capacity));
    let mut events = bus.subscribe();
    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    tracing::info!(switch = %event.address, active = event.active, "switch");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "switch event log lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Platform
    let service = PlatformService::new(
        StreamCommandSink::new(tokio::io::stdout()),
        Arc::clone(&bus),
        config.watchdog_period(),
    );
    for board in config.extensions {
        service.register_extension_board(board)?;
    }
    for board in config.lightshows {
        service.register_lightshow_board(board)?;
    }
    tracing::info!("\n{}", service.info_string());

    service.start();

    let mut reader = FrameReader::new(tokio::io::stdin());
    let outcome = tokio::select! {
        result = forward_frames(&mut reader, &service) => result,
        signal = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            signal.map_err(|err| PkoneError::Transport(Box::new(err)))
        }
    };

    service.stop().await?;
    event_log.abort();
    outcome?;
    Ok(())
}
