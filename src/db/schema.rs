//! SQL DDL for initializing the scheduler storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `accounts`: one row per registered user, keyed by username; `role` is
///   either 'patient' or 'caregiver'
/// - `availabilities`: open (caregiver, day) slots; the composite PRIMARY KEY
///   enforces at most one slot per caregiver per day
/// - `vaccines`: remaining dose count per vaccine name; the CHECK keeps the
///   counter from ever going negative at the storage layer
/// - `appointments`: booked appointments, keyed by an opaque string id
///
/// Dates are ISO-8601 calendar dates stored as TEXT, so lexicographic order
/// matches chronological order.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    username TEXT PRIMARY KEY,
    salt TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('patient', 'caregiver'))
);

CREATE TABLE IF NOT EXISTS availabilities (
    caregiver TEXT NOT NULL,
    day TEXT NOT NULL,
    PRIMARY KEY (caregiver, day)
);

CREATE INDEX IF NOT EXISTS idx_availabilities_day ON availabilities(day);

CREATE TABLE IF NOT EXISTS vaccines (
    name TEXT PRIMARY KEY,
    doses INTEGER NOT NULL CHECK (doses >= 0)
);

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    day TEXT NOT NULL,
    patient TEXT NOT NULL,
    caregiver TEXT NOT NULL,
    vaccine TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient);
CREATE INDEX IF NOT EXISTS idx_appointments_caregiver ON appointments(caregiver);
"#;
