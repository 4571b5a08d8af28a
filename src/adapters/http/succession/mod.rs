//! HTTP adapter for succession endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::ErrorResponse;
pub use handlers::{ApiError, SuccessionHandlers};
pub use routes::succession_routes;
