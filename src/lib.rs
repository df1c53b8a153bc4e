pub mod config;
pub mod db;
pub mod error;
pub mod repl;
pub mod service;

pub use error::SchedulerError;
pub use service::booking::{BookingEngine, Reservation};
pub use service::session::SessionContext;
