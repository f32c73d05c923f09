//! # pkone-adapter-stream
//!
//! Byte-stream adapter — connects the PKONE platform to any tokio
//! [`AsyncWrite`](tokio::io::AsyncWrite) / [`AsyncRead`](tokio::io::AsyncRead)
//! pair (a serial port, a pipe, stdio).
//!
//! ## Responsibilities
//! - Implement the `CommandSink` port by writing rendered commands
//! - Split the inbound byte stream into `…E` frames
//! - Pump inbound frames into `PlatformService`
//!
//! ## Dependency rule
//! Depends on `pkone-app` (for port traits) and `pkone-domain` (for types).
//! Opening and configuring the physical link stays with the caller.

pub mod error;
pub mod forward;
pub mod reader;
pub mod sink;

pub use error::StreamError;
pub use forward::forward_frames;
pub use reader::FrameReader;
pub use sink::StreamCommandSink;
