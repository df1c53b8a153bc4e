use crate::db::sqlite::{SqlitePool, is_unique_violation};
use crate::error::SchedulerError;
use chrono::NaiveDate;
use sqlx::SqliteExecutor;

/// Open (caregiver, day) slots. A caregiver has at most one open slot per
/// day, and a slot is consumed by exactly one reservation.
#[derive(Clone)]
pub struct AvailabilityCalendar {
    pool: SqlitePool,
}

impl AvailabilityCalendar {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Publish an open slot. Re-uploading the same day is a conflict, not a
    /// no-op.
    pub async fn upload(&self, caregiver: &str, day: NaiveDate) -> Result<(), SchedulerError> {
        let res = sqlx::query("INSERT INTO availabilities (caregiver, day) VALUES (?, ?)")
            .bind(caregiver)
            .bind(day)
            .execute(&self.pool)
            .await;
        match res {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(SchedulerError::Conflict(format!(
                "availability for {caregiver} on {day}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Caregivers with an open slot on `day`, in ascending username order.
    pub async fn caregivers_on(&self, day: NaiveDate) -> Result<Vec<String>, SchedulerError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT caregiver FROM availabilities WHERE day = ? ORDER BY caregiver")
                .bind(day)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(caregiver,)| caregiver).collect())
    }

    /// Take the lowest-username open slot for `day`, deleting it in the same
    /// statement. The caller cannot pick the caregiver, only the day.
    pub(crate) async fn reserve_any<'e, E>(ex: E, day: NaiveDate) -> Result<String, SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        let taken: Option<(String,)> = sqlx::query_as(
            r#"DELETE FROM availabilities
               WHERE day = ?1 AND caregiver = (
                   SELECT caregiver FROM availabilities WHERE day = ?1
                   ORDER BY caregiver LIMIT 1
               )
               RETURNING caregiver"#,
        )
        .bind(day)
        .fetch_optional(ex)
        .await?;
        taken
            .map(|(caregiver,)| caregiver)
            .ok_or(SchedulerError::NoSlot(day))
    }

    /// Put a consumed slot back. Merges silently with an identical slot the
    /// caregiver re-uploaded in the meantime.
    pub(crate) async fn restore<'e, E>(
        ex: E,
        caregiver: &str,
        day: NaiveDate,
    ) -> Result<(), SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"INSERT INTO availabilities (caregiver, day) VALUES (?, ?)
               ON CONFLICT(caregiver, day) DO NOTHING"#,
        )
        .bind(caregiver)
        .bind(day)
        .execute(ex)
        .await?;
        Ok(())
    }
}
