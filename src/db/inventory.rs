use crate::db::models::VaccineStock;
use crate::db::sqlite::{SqlitePool, is_unique_violation};
use crate::error::SchedulerError;
use sqlx::SqliteExecutor;

/// Remaining dose count per vaccine name.
///
/// All mutations are single guarded statements, so two concurrent reserves
/// against the last dose resolve to exactly one success.
#[derive(Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn fetch(&self, name: &str) -> Result<Option<VaccineStock>, SchedulerError> {
        Self::fetch_with(&self.pool, name).await
    }

    /// Every vaccine with its remaining doses, in ascending name order.
    pub async fn snapshot(&self) -> Result<Vec<VaccineStock>, SchedulerError> {
        Ok(
            sqlx::query_as::<_, VaccineStock>("SELECT name, doses FROM vaccines ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Register a new vaccine with an initial dose count. An existing name is
    /// a conflict.
    pub async fn create(&self, name: &str, initial_doses: i64) -> Result<(), SchedulerError> {
        if initial_doses < 0 {
            return Err(SchedulerError::Validation(
                "initial dose count must not be negative".to_string(),
            ));
        }
        let res = sqlx::query("INSERT INTO vaccines (name, doses) VALUES (?, ?)")
            .bind(name)
            .bind(initial_doses)
            .execute(&self.pool)
            .await;
        match res {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(SchedulerError::Conflict(format!("vaccine {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add doses to an existing vaccine.
    pub async fn increase(&self, name: &str, n: i64) -> Result<(), SchedulerError> {
        if !Self::increase_with(&self.pool, name, n).await? {
            return Err(SchedulerError::UnknownVaccine(name.to_string()));
        }
        Ok(())
    }

    pub(crate) async fn fetch_with<'e, E>(
        ex: E,
        name: &str,
    ) -> Result<Option<VaccineStock>, SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(
            sqlx::query_as::<_, VaccineStock>("SELECT name, doses FROM vaccines WHERE name = ?")
                .bind(name)
                .fetch_optional(ex)
                .await?,
        )
    }

    /// Test-and-increment. Returns false when no such vaccine exists.
    pub(crate) async fn increase_with<'e, E>(
        ex: E,
        name: &str,
        n: i64,
    ) -> Result<bool, SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        if n <= 0 {
            return Err(SchedulerError::Validation(
                "dose count must be positive".to_string(),
            ));
        }
        let res = sqlx::query("UPDATE vaccines SET doses = doses + ? WHERE name = ?")
            .bind(n)
            .bind(name)
            .execute(ex)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Test-and-decrement. The `doses >= n` guard never lets the counter go
    /// negative; an unsatisfied guard is an insufficient-stock failure.
    pub(crate) async fn decrease_with<'e, E>(
        ex: E,
        name: &str,
        n: i64,
    ) -> Result<(), SchedulerError>
    where
        E: SqliteExecutor<'e>,
    {
        if n <= 0 {
            return Err(SchedulerError::Validation(
                "dose count must be positive".to_string(),
            ));
        }
        let res = sqlx::query("UPDATE vaccines SET doses = doses - ? WHERE name = ? AND doses >= ?")
            .bind(n)
            .bind(name)
            .bind(n)
            .execute(ex)
            .await?;
        if res.rows_affected() == 0 {
            return Err(SchedulerError::InsufficientStock(name.to_string()));
        }
        Ok(())
    }
}
