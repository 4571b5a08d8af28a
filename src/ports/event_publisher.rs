//! EventPublisher port - Interface for the notification dispatcher.
//!
//! The succession core hands events to this port after a write commits.
//! Delivery is fire-and-forget from the core's point of view: callers log
//! a failed publish and carry on.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// # Example
///
/// ```ignore
/// let envelope = ApproachCreated::from(&approach).to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
