//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - PostgreSQL repositories (sqlx)
//! - `memory` - In-memory store used in tests and local runs
//! - `events` - Event publishers (in-memory bus, tracing logger)
//! - `http` - axum REST surface
//! - `wiring` - Bundles one implementation of every port

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod wiring;

pub use events::{InMemoryEventBus, LoggingEventPublisher};
pub use memory::InMemorySuccessionStore;
pub use wiring::SuccessionPorts;
