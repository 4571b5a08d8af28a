//! PostgreSQL implementation of MeetingRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::domain::foundation::{CycleId, DomainError, ErrorCode, MeetingId};
use crate::domain::succession::{Meeting, PhaseGate, StatusHistoryEntry};
use crate::ports::MeetingRepository;

use super::support::{
    append_history, begin, column, commit, db_error, explain_missed_update, lock_phase, parsed,
    timestamp,
};

const SELECT_MEETING: &str = r#"
    SELECT id, cycle_id, meeting_type, meeting_date, status, outcome_notes,
           created_at, updated_at
    FROM succession_meetings
"#;

#[derive(Clone)]
pub struct PostgresMeetingRepository {
    pool: PgPool,
}

impl PostgresMeetingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingRepository for PostgresMeetingRepository {
    async fn create(
        &self,
        gate: &PhaseGate,
        meeting: &Meeting,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        sqlx::query(
            r#"
            INSERT INTO succession_meetings (
                id, cycle_id, meeting_type, meeting_date, status, outcome_notes,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(meeting.id.as_uuid())
        .bind(meeting.cycle_id.as_uuid())
        .bind(meeting.meeting_type.as_str())
        .bind(meeting.meeting_date)
        .bind(meeting.status.as_str())
        .bind(meeting.outcome_notes.as_deref())
        .bind(meeting.created_at.as_datetime())
        .bind(meeting.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert meeting"))?;

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn update_status(
        &self,
        gate: &PhaseGate,
        meeting: &Meeting,
        entry: &StatusHistoryEntry,
    ) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_phase(&mut tx, gate).await?;

        let result = sqlx::query(
            r#"
            UPDATE succession_meetings SET
                status = $2,
                outcome_notes = $3,
                updated_at = $4
            WHERE id = $1
              AND ($5::text IS NULL OR status = $5)
            "#,
        )
        .bind(meeting.id.as_uuid())
        .bind(meeting.status.as_str())
        .bind(meeting.outcome_notes.as_deref())
        .bind(meeting.updated_at.as_datetime())
        .bind(entry.from_status.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update meeting"))?;

        if result.rows_affected() == 0 {
            return Err(explain_missed_update(
                &mut tx,
                "succession_meetings",
                meeting.id.as_uuid(),
                ErrorCode::MeetingNotFound,
            )
            .await);
        }

        append_history(&mut tx, entry).await?;
        commit(tx).await
    }

    async fn find_by_id(&self, id: &MeetingId) -> Result<Option<Meeting>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_MEETING);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch meeting"))?;

        row.as_ref().map(row_to_meeting).transpose()
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<Meeting>, DomainError> {
        let sql = format!("{} WHERE cycle_id = $1 ORDER BY meeting_date, id", SELECT_MEETING);
        let rows = sqlx::query(&sql)
            .bind(cycle_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch meetings"))?;

        rows.iter().map(row_to_meeting).collect()
    }
}

fn row_to_meeting(row: &PgRow) -> Result<Meeting, DomainError> {
    Ok(Meeting {
        id: MeetingId::from_uuid(column(row, "id")?),
        cycle_id: CycleId::from_uuid(column(row, "cycle_id")?),
        meeting_type: parsed(row, "meeting_type")?,
        meeting_date: column(row, "meeting_date")?,
        status: parsed(row, "status")?,
        outcome_notes: column(row, "outcome_notes")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}
