//! Shared test fixture: every test gets its own throwaway SQLite file.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use vaxsched::db::SqlitePool;
use vaxsched::db::accounts::AccountStore;
use vaxsched::db::calendar::AvailabilityCalendar;
use vaxsched::db::inventory::InventoryLedger;
use vaxsched::db::registry::AppointmentRegistry;
use vaxsched::service::accounts::AccountService;
use vaxsched::service::booking::BookingEngine;

pub struct Fixture {
    pub pool: SqlitePool,
    pub accounts: AccountService,
    pub calendar: AvailabilityCalendar,
    pub inventory: InventoryLedger,
    pub registry: AppointmentRegistry,
    pub engine: BookingEngine,
    path: PathBuf,
}

pub async fn fixture(tag: &str) -> Fixture {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "vaxsched-{tag}-{}-{nanos}.sqlite",
        std::process::id()
    ));

    let database_url = format!("sqlite:{}", path.display());
    let pool = vaxsched::db::connect(&database_url)
        .await
        .expect("failed to open test database");

    Fixture {
        accounts: AccountService::new(AccountStore::new(pool.clone())),
        calendar: AvailabilityCalendar::new(pool.clone()),
        inventory: InventoryLedger::new(pool.clone()),
        registry: AppointmentRegistry::new(pool.clone()),
        engine: BookingEngine::new(pool.clone()),
        pool,
        path,
    }
}

impl Fixture {
    /// Remaining doses for a vaccine that is expected to exist.
    pub async fn doses(&self, name: &str) -> i64 {
        self.inventory
            .fetch(name)
            .await
            .expect("inventory fetch failed")
            .expect("vaccine missing")
            .doses
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = fs::remove_file(PathBuf::from(p));
        }
    }
}

pub fn day(s: &str) -> NaiveDate {
    s.parse().expect("bad date literal in test")
}
