//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, events)
//! - `succession` - Succession cycles, nominations, scoring, approaches,
//!   meetings and statistics

pub mod foundation;
pub mod succession;
