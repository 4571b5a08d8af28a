//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Schema lives in `migrations/`. Every state change and its status history
//! row are written in one transaction.

mod approach_repository;
mod cycle_repository;
mod evaluation_repository;
mod meeting_repository;
mod nomination_repository;
mod position_repository;
mod rc_approval_repository;
mod status_history_reader;
mod support;

pub use approach_repository::PostgresApproachRepository;
pub use cycle_repository::PostgresCycleRepository;
pub use evaluation_repository::PostgresEvaluationRepository;
pub use meeting_repository::PostgresMeetingRepository;
pub use nomination_repository::PostgresNominationRepository;
pub use position_repository::PostgresPositionRepository;
pub use rc_approval_repository::PostgresRcApprovalRepository;
pub use status_history_reader::PostgresStatusHistoryReader;
