//! HTTP middleware for axum.
//!
//! - `actor` - Extractors for the gateway-supplied caller identity

pub mod actor;

pub use actor::{ActorRejection, OptionalActor, RequireActor, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
