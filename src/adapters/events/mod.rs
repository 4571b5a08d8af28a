//! Event publishing adapters.
//!
//! - `InMemoryEventBus` - Captures envelopes for tests and local runs
//! - `LoggingEventPublisher` - Writes envelopes to the tracing log

mod in_memory;
mod logging;

pub use in_memory::InMemoryEventBus;
pub use logging::LoggingEventPublisher;
