use crate::db::models::Appointment;
use crate::db::sqlite::SqlitePool;
use crate::error::SchedulerError;
use sqlx::SqliteExecutor;

/// Durable record of booked appointments, keyed by an opaque string id.
/// Ids are generated at reservation time and never reused.
#[derive(Clone)]
pub struct AppointmentRegistry {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "SELECT id, day, patient, caregiver, vaccine FROM appointments";

impl AppointmentRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn fetch(&self, id: &str) -> Result<Option<Appointment>, SchedulerError> {
        Self::fetch_with(&self.pool, id).await
    }

    /// A patient's appointments, ordered by appointment id.
    pub async fn for_patient(&self, username: &str) -> Result<Vec<Appointment>, SchedulerError> {
        Ok(
            sqlx::query_as::<_, Appointment>(&format!(
                "{SELECT_COLUMNS} WHERE patient = ? ORDER BY id"
            ))
            .bind(username)
            .fetch_all(&self.pool)
            .await?,
        )
    }

    /// A caregiver's appointments, ordered by appointment id.
    pub async fn for_caregiver(&self, username: &str) -> Result<Vec<Appointment>, SchedulerError> {
        Ok(
            sqlx::query_as::<_, Appointment>(&format!(
                "{SELECT_COLUMNS} WHERE caregiver = ? ORDER BY id"
            ))
            .bind(username)
            .fetch_all(&self.pool)
            .await?,
        )
    }

    pub(crate) async fn fetch_with<'e, E>(
        ex: E,
        id: &str,
    ) -> Result<Option<Appointment>, SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(
            sqlx::query_as::<_, Appointment>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                .bind(id)
                .fetch_optional(ex)
                .await?,
        )
    }

    pub(crate) async fn insert_with<'e, E>(
        ex: E,
        appointment: &Appointment,
    ) -> Result<(), SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO appointments (id, day, patient, caregiver, vaccine) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&appointment.id)
        .bind(appointment.day)
        .bind(&appointment.patient)
        .bind(&appointment.caregiver)
        .bind(&appointment.vaccine)
        .execute(ex)
        .await?;
        Ok(())
    }

    /// Remove an appointment. Deleting an id that is not present is a
    /// not-found failure, so a second cancel of the same id cannot succeed.
    pub(crate) async fn delete_with<'e, E>(ex: E, id: &str) -> Result<(), SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        let res = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(ex)
            .await?;
        if res.rows_affected() == 0 {
            return Err(SchedulerError::AppointmentNotFound(id.to_string()));
        }
        Ok(())
    }
}
