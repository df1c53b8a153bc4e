use crate::db::calendar::AvailabilityCalendar;
use crate::db::inventory::InventoryLedger;
use crate::db::models::{Appointment, Role};
use crate::db::registry::AppointmentRegistry;
use crate::db::sqlite::SqlitePool;
use crate::error::SchedulerError;
use crate::service::session::SessionContext;
use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of a successful reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub appointment_id: String,
    pub caregiver: String,
}

/// Coordinates the calendar, ledger and registry so a reservation (and its
/// cancellation) applies to all three stores or to none.
///
/// The engine owns no data. Every operation runs as one SQLite transaction;
/// an early failure drops the transaction, which rolls back whatever was
/// provisionally consumed, so no partial effect is ever visible to other
/// callers.
#[derive(Clone)]
pub struct BookingEngine {
    pool: SqlitePool,
}

impl BookingEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Book one dose of `vaccine` with any caregiver free on `day`.
    ///
    /// The lowest-username caregiver is selected and that slot consumed; the
    /// caller cannot pick the caregiver. On success the slot is gone, the
    /// dose count is one lower, and the appointment is recorded, all at once.
    pub async fn reserve(
        &self,
        session: &SessionContext,
        day: NaiveDate,
        vaccine: &str,
    ) -> Result<Reservation, SchedulerError> {
        let patient = session.require_patient()?;

        let mut tx = self.pool.begin().await?;

        let caregiver = AvailabilityCalendar::reserve_any(&mut *tx, day).await?;

        if InventoryLedger::fetch_with(&mut *tx, vaccine).await?.is_none() {
            // dropping the transaction puts the slot back
            return Err(SchedulerError::UnknownVaccine(vaccine.to_string()));
        }
        InventoryLedger::decrease_with(&mut *tx, vaccine, 1).await?;

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            day,
            patient: patient.to_string(),
            caregiver: caregiver.clone(),
            vaccine: vaccine.to_string(),
        };
        AppointmentRegistry::insert_with(&mut *tx, &appointment).await?;

        tx.commit().await?;

        info!(
            appointment_id = %appointment.id,
            patient = %appointment.patient,
            caregiver = %caregiver,
            day = %day,
            vaccine,
            "reservation booked"
        );
        Ok(Reservation {
            appointment_id: appointment.id,
            caregiver,
        })
    }

    /// Cancel an appointment by id, releasing its slot and dose.
    ///
    /// Only the booked patient or the assigned caregiver may cancel. The
    /// appointment row is deleted before either resource is restored, so no
    /// state where the appointment and its freed resources coexist is ever
    /// committed. A cancelled id stays gone; cancelling it again is a
    /// not-found failure.
    pub async fn cancel(
        &self,
        session: &SessionContext,
        appointment_id: &str,
    ) -> Result<(), SchedulerError> {
        let (username, role) = session.require_authenticated()?;

        let mut tx = self.pool.begin().await?;

        let appointment = AppointmentRegistry::fetch_with(&mut *tx, appointment_id)
            .await?
            .ok_or_else(|| SchedulerError::AppointmentNotFound(appointment_id.to_string()))?;

        let authorized = match role {
            Role::Patient => appointment.patient == username,
            Role::Caregiver => appointment.caregiver == username,
        };
        if !authorized {
            return Err(SchedulerError::Permission);
        }

        AppointmentRegistry::delete_with(&mut *tx, appointment_id).await?;
        AvailabilityCalendar::restore(&mut *tx, &appointment.caregiver, appointment.day).await?;
        if !InventoryLedger::increase_with(&mut *tx, &appointment.vaccine, 1).await? {
            debug!(
                vaccine = %appointment.vaccine,
                "vaccine no longer exists; dose not restored"
            );
        }

        tx.commit().await?;

        info!(appointment_id, by = username, "appointment cancelled");
        Ok(())
    }
}
