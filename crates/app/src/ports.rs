//! Port definitions — traits that adapters implement.
//!
//! Ports are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod command_sink;
pub mod switch_events;

pub use command_sink::CommandSink;
pub use switch_events::SwitchEventPublisher;
