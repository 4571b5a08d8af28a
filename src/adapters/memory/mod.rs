//! In-memory repository adapter for tests and local runs.

mod store;

pub use store::InMemorySuccessionStore;
