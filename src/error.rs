use crate::db::models::Role;
use chrono::NaiveDate;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SchedulerError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("no user is logged in")]
    LoginRequired,

    #[error("operation requires the {0} role")]
    WrongRole(Role),

    #[error("requester is not named on the appointment")]
    Permission,

    #[error("no caregiver has an open slot on {0}")]
    NoSlot(NaiveDate),

    #[error("unknown vaccine: {0}")]
    UnknownVaccine(String),

    #[error("not enough remaining doses of {0}")]
    InsufficientStock(String),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("login failed")]
    LoginFailed,

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] SqlxError),
}

impl SchedulerError {
    /// One-line message shown at the prompt when a command fails.
    /// Internal failures are collapsed; details go to the log, not the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(reason) => format!("Invalid input: {reason}."),
            Self::LoginRequired => "Please login first.".to_string(),
            Self::WrongRole(Role::Patient) => "Please login as a patient.".to_string(),
            Self::WrongRole(Role::Caregiver) => "Please login as a caregiver.".to_string(),
            Self::Permission => {
                "You don't have permission to cancel this appointment.".to_string()
            }
            Self::NoSlot(day) => format!("No caregiver is available on {day}."),
            Self::UnknownVaccine(name) => format!("Unknown vaccine: {name}."),
            Self::InsufficientStock(name) => format!("Not enough available doses of {name}."),
            Self::AppointmentNotFound(id) => format!("Appointment {id} not found."),
            Self::Conflict(what) => format!("{what} already exists."),
            Self::LoginFailed => "Login failed.".to_string(),
            Self::PasswordHash(_) | Self::Database(_) => "Please try again.".to_string(),
        }
    }
}
