//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the succession domain and the outside world. Adapters implement these
//! ports.
//!
//! ## Repository Ports
//!
//! - `CycleRepository` - Cycles and the one-active-cycle-per-scope rule
//! - `PositionRepository` - Positions and criteria (the criteria store)
//! - `NominationRepository` - Nominations
//! - `EvaluationRepository` - Flat per-criterion score rows
//! - `ApproachRepository` - Candidate outreach records
//! - `MeetingRepository` - Committee meetings
//! - `RcApprovalRepository` - Regional council approvals
//! - `StatusHistoryReader` - Append-only status history
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Notification dispatcher

mod approach_repository;
mod cycle_repository;
mod evaluation_repository;
mod event_publisher;
mod meeting_repository;
mod nomination_repository;
mod position_repository;
mod rc_approval_repository;
mod status_history_reader;

pub use approach_repository::ApproachRepository;
pub use cycle_repository::CycleRepository;
pub use evaluation_repository::{EvaluationRepository, ReviewStart};
pub use event_publisher::EventPublisher;
pub use meeting_repository::MeetingRepository;
pub use nomination_repository::NominationRepository;
pub use position_repository::PositionRepository;
pub use rc_approval_repository::RcApprovalRepository;
pub use status_history_reader::StatusHistoryReader;
