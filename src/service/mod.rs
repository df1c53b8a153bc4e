pub mod accounts;
pub mod booking;
pub mod session;

pub use booking::{BookingEngine, Reservation};
pub use session::SessionContext;
