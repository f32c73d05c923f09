//! # pkone-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `CommandSink` — deliver commands to the controller
//!   - `SwitchEventPublisher` — hand switch transitions to the application
//! - Provide **in-process infrastructure** that doesn't need IO (switch event
//!   bus, heartbeat watchdog)
//! - Orchestrate registry, codecs and validation in `PlatformService` without
//!   knowing *how* bytes reach the board
//!
//! ## Dependency rule
//! Depends on `pkone-domain` only (plus `tokio` for channels, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
pub mod watchdog;
