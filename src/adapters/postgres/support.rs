//! Shared helpers for the PostgreSQL repositories.

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Postgres, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, NominationId, Timestamp, UserId, ValidationError,
};
use crate::domain::succession::{
    CyclePhase, Entity, NominationStatus, PhaseGate, StatusHistoryEntry, SuccessionError,
};

/// Unique constraint name and the error reported when it is violated.
pub(super) type ConstraintRule = (&'static str, ErrorCode, &'static str);

/// Maps a write failure to a domain error, turning known unique
/// constraints into conflicts.
pub(super) fn write_error(
    context: &'static str,
    rules: &'static [ConstraintRule],
) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                if let Some((_, code, message)) = rules
                    .iter()
                    .find(|(name, _, _)| db_err.constraint() == Some(*name))
                {
                    return DomainError::new(*code, *message);
                }
            }
        }
        DomainError::database(context, e)
    }
}

pub(super) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::database(context, e)
}

pub(super) async fn begin(
    pool: &sqlx::PgPool,
) -> Result<sqlx::Transaction<'static, Postgres>, DomainError> {
    pool.begin()
        .await
        .map_err(|e| DomainError::database("Failed to begin transaction", e))
}

pub(super) async fn commit(tx: sqlx::Transaction<'static, Postgres>) -> Result<(), DomainError> {
    tx.commit()
        .await
        .map_err(|e| DomainError::database("Failed to commit transaction", e))
}

/// Share-locks the gate's cycle row for the rest of the transaction and
/// checks its phase. A concurrent phase change waits for the commit.
pub(super) async fn lock_phase(
    conn: &mut PgConnection,
    gate: &PhaseGate,
) -> Result<(), DomainError> {
    let phase: Option<String> =
        sqlx::query_scalar("SELECT phase FROM succession_cycles WHERE id = $1 FOR SHARE")
            .bind(gate.cycle_id.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to lock cycle phase"))?;

    let phase = phase.ok_or_else(|| {
        DomainError::new(
            ErrorCode::CycleNotFound,
            format!("Cycle not found: {}", gate.cycle_id),
        )
        .with_detail("id", gate.cycle_id.to_string())
    })?;
    let phase: CyclePhase = phase.parse().map_err(|e| corrupt("phase", e))?;
    gate.check(phase).map_err(DomainError::from)
}

/// Share-locks a nomination row and rejects it if withdrawn.
pub(super) async fn lock_active_nomination(
    conn: &mut PgConnection,
    id: &NominationId,
    operation: &str,
) -> Result<NominationStatus, DomainError> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM succession_nominations WHERE id = $1 FOR SHARE")
            .bind(id.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to lock nomination"))?;

    let status: NominationStatus = status
        .ok_or_else(|| {
            DomainError::new(ErrorCode::NominationNotFound, format!("Nomination not found: {}", id))
                .with_detail("id", id.to_string())
        })?
        .parse()
        .map_err(|e| corrupt("status", e))?;
    if status == NominationStatus::Withdrawn {
        return Err(SuccessionError::state_transition(Entity::Nomination, status, operation).into());
    }
    Ok(status)
}

/// Inserts one status history row on the given connection.
pub(super) async fn append_history(
    conn: &mut PgConnection,
    entry: &StatusHistoryEntry,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO succession_status_history (
            id, entity_kind, entity_id, from_status, to_status, changed_by, changed_at, notes
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.entity.as_str())
    .bind(entry.entity_id)
    .bind(entry.from_status.as_deref())
    .bind(&entry.to_status)
    .bind(entry.changed_by.as_ref().map(|u| u.as_str()))
    .bind(entry.changed_at.as_datetime())
    .bind(entry.notes.as_deref())
    .execute(conn)
    .await
    .map_err(db_error("Failed to append status history"))?;

    Ok(())
}

/// Explains why a guarded `UPDATE ... WHERE id = $1 AND status = $n` touched
/// no rows: the record is gone, or its status moved underneath us.
pub(super) async fn explain_missed_update(
    conn: &mut PgConnection,
    table: &'static str,
    id: &Uuid,
    not_found: ErrorCode,
) -> DomainError {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
    match sqlx::query_scalar::<_, bool>(&sql).bind(id).fetch_one(conn).await {
        Ok(true) => DomainError::new(
            ErrorCode::Conflict,
            format!("{} changed concurrently", id),
        ),
        Ok(false) => DomainError::new(not_found, format!("Not found: {}", id))
            .with_detail("id", id.to_string()),
        Err(e) => DomainError::database("Failed to check record existence", e),
    }
}

pub(super) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("Failed to get {}", name), e))
}

pub(super) fn timestamp(row: &PgRow, name: &str) -> Result<Timestamp, DomainError> {
    column::<chrono::DateTime<chrono::Utc>>(row, name).map(Timestamp::from_datetime)
}

pub(super) fn user_id(row: &PgRow, name: &str) -> Result<UserId, DomainError> {
    UserId::new(column::<String>(row, name)?).map_err(|e| corrupt(name, e))
}

pub(super) fn optional_user_id(row: &PgRow, name: &str) -> Result<Option<UserId>, DomainError> {
    column::<Option<String>>(row, name)?
        .map(|raw| UserId::new(raw).map_err(|e| corrupt(name, e)))
        .transpose()
}

/// Parses a stored enum value through its `FromStr` wire name.
pub(super) fn parsed<T>(row: &PgRow, name: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = ValidationError>,
{
    column::<String>(row, name)?
        .parse::<T>()
        .map_err(|e| corrupt(name, e))
}

/// Reads a signed column into a narrower unsigned domain type.
pub(super) fn narrowed<'r, S, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    S: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres> + Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    let raw: S = column(row, name)?;
    T::try_from(raw).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Column {} out of range: {}", name, raw),
        )
    })
}

fn corrupt(column: &str, err: ValidationError) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid value in column {}: {}", column, err),
    )
}
