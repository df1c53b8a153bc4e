//! Interactive command loop.
//!
//! Each line is one whitespace-separated command. The dispatcher validates
//! argument shape and session role, calls into the engine or the stores,
//! prints a one-line result, and keeps the loop going on every failure.

use crate::db::accounts::AccountStore;
use crate::db::calendar::AvailabilityCalendar;
use crate::db::inventory::InventoryLedger;
use crate::db::models::{Appointment, Role, VaccineStock};
use crate::db::registry::AppointmentRegistry;
use crate::db::sqlite::SqlitePool;
use crate::error::SchedulerError;
use crate::service::accounts::AccountService;
use crate::service::booking::BookingEngine;
use crate::service::session::SessionContext;
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

pub const GREETING: &str = "\
Welcome to the Vaccine Reservation Scheduling Application!
*** Please enter one of the following commands ***
> create_patient <username> <password>
> create_caregiver <username> <password>
> login_patient <username> <password>
> login_caregiver <username> <password>
> search_caregiver_schedule <date>
> reserve <date> <vaccine>
> upload_availability <date>
> cancel <appointment_id>
> add_doses <vaccine> <number>
> show_appointments
> logout
> quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    CreatePatient { username: String, password: String },
    CreateCaregiver { username: String, password: String },
    LoginPatient { username: String, password: String },
    LoginCaregiver { username: String, password: String },
    SearchCaregiverSchedule { day: NaiveDate },
    Reserve { day: NaiveDate, vaccine: String },
    UploadAvailability { day: NaiveDate },
    Cancel { appointment_id: String },
    AddDoses { vaccine: String, count: i64 },
    ShowAppointments,
    Logout,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, SchedulerError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&op, args)) = tokens.split_first() else {
        return Err(SchedulerError::Validation("empty command".to_string()));
    };
    match op {
        "create_patient" => {
            let [username, password] = take(args, "create_patient <username> <password>")?;
            Ok(Command::CreatePatient {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        "create_caregiver" => {
            let [username, password] = take(args, "create_caregiver <username> <password>")?;
            Ok(Command::CreateCaregiver {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        "login_patient" => {
            let [username, password] = take(args, "login_patient <username> <password>")?;
            Ok(Command::LoginPatient {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        "login_caregiver" => {
            let [username, password] = take(args, "login_caregiver <username> <password>")?;
            Ok(Command::LoginCaregiver {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        "search_caregiver_schedule" => {
            let [day] = take(args, "search_caregiver_schedule <date>")?;
            Ok(Command::SearchCaregiverSchedule {
                day: parse_day(day)?,
            })
        }
        "reserve" => {
            let [day, vaccine] = take(args, "reserve <date> <vaccine>")?;
            Ok(Command::Reserve {
                day: parse_day(day)?,
                vaccine: vaccine.to_string(),
            })
        }
        "upload_availability" => {
            let [day] = take(args, "upload_availability <date>")?;
            Ok(Command::UploadAvailability {
                day: parse_day(day)?,
            })
        }
        "cancel" => {
            let [appointment_id] = take(args, "cancel <appointment_id>")?;
            Ok(Command::Cancel {
                appointment_id: appointment_id.to_string(),
            })
        }
        "add_doses" => {
            let [vaccine, count] = take(args, "add_doses <vaccine> <number>")?;
            Ok(Command::AddDoses {
                vaccine: vaccine.to_string(),
                count: parse_count(count)?,
            })
        }
        "show_appointments" => {
            take::<0>(args, "show_appointments")?;
            Ok(Command::ShowAppointments)
        }
        "logout" => {
            take::<0>(args, "logout")?;
            Ok(Command::Logout)
        }
        "quit" => {
            take::<0>(args, "quit")?;
            Ok(Command::Quit)
        }
        _ => Err(SchedulerError::Validation(format!("unknown command: {op}"))),
    }
}

fn take<'a, const N: usize>(
    args: &[&'a str],
    usage: &str,
) -> Result<[&'a str; N], SchedulerError> {
    <[&'a str; N]>::try_from(args)
        .map_err(|_| SchedulerError::Validation(format!("usage: {usage}")))
}

fn parse_day(s: &str) -> Result<NaiveDate, SchedulerError> {
    s.parse().map_err(|_| {
        SchedulerError::Validation(format!("{s} is not a calendar date (expected YYYY-MM-DD)"))
    })
}

fn parse_count(s: &str) -> Result<i64, SchedulerError> {
    let count: i64 = s
        .parse()
        .map_err(|_| SchedulerError::Validation(format!("{s} is not a whole number")))?;
    if count <= 0 {
        return Err(SchedulerError::Validation(
            "dose count must be positive".to_string(),
        ));
    }
    Ok(count)
}

/// What the loop should do after a line has been handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

/// One interactive session: the command dispatcher plus its own session
/// state. Concurrent sessions each get their own `Dispatcher` over a shared
/// pool.
pub struct Dispatcher {
    accounts: AccountService,
    calendar: AvailabilityCalendar,
    inventory: InventoryLedger,
    registry: AppointmentRegistry,
    engine: BookingEngine,
    session: SessionContext,
}

impl Dispatcher {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            accounts: AccountService::new(AccountStore::new(pool.clone())),
            calendar: AvailabilityCalendar::new(pool.clone()),
            inventory: InventoryLedger::new(pool.clone()),
            registry: AppointmentRegistry::new(pool.clone()),
            engine: BookingEngine::new(pool),
            session: SessionContext::default(),
        }
    }

    /// Handle one input line; failures become their one-line message.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Lines(Vec::new());
        }
        match self.dispatch(line).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, "command failed");
                Reply::Lines(vec![e.user_message()])
            }
        }
    }

    async fn dispatch(&mut self, line: &str) -> Result<Reply, SchedulerError> {
        let lines = match parse_command(line)? {
            Command::CreatePatient { username, password } => {
                self.create_account(Role::Patient, &username, &password)
                    .await?
            }
            Command::CreateCaregiver { username, password } => {
                self.create_account(Role::Caregiver, &username, &password)
                    .await?
            }
            Command::LoginPatient { username, password } => {
                self.login(Role::Patient, &username, &password).await?
            }
            Command::LoginCaregiver { username, password } => {
                self.login(Role::Caregiver, &username, &password).await?
            }
            Command::SearchCaregiverSchedule { day } => self.search_schedule(day).await?,
            Command::Reserve { day, vaccine } => self.reserve(day, &vaccine).await?,
            Command::UploadAvailability { day } => self.upload_availability(day).await?,
            Command::Cancel { appointment_id } => self.cancel(&appointment_id).await?,
            Command::AddDoses { vaccine, count } => self.add_doses(&vaccine, count).await?,
            Command::ShowAppointments => self.show_appointments().await?,
            Command::Logout => self.logout()?,
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Lines(lines))
    }

    async fn create_account(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<Vec<String>, SchedulerError> {
        self.accounts.register(role, username, password).await?;
        Ok(vec![format!("Created user {username}")])
    }

    async fn login(
        &mut self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<Vec<String>, SchedulerError> {
        if !self.session.is_anonymous() {
            return Ok(vec!["User already logged in.".to_string()]);
        }
        self.session = self.accounts.login(role, username, password).await?;
        Ok(vec![format!("Logged in as: {username}")])
    }

    fn logout(&mut self) -> Result<Vec<String>, SchedulerError> {
        let (username, _) = self.session.require_authenticated()?;
        let line = format!("Successfully logged out: {username}");
        self.session = SessionContext::Anonymous;
        Ok(vec![line])
    }

    async fn search_schedule(&self, day: NaiveDate) -> Result<Vec<String>, SchedulerError> {
        self.session.require_authenticated()?;
        let caregivers = self.calendar.caregivers_on(day).await?;
        if caregivers.is_empty() {
            // an empty schedule is a normal result, not an error
            return Ok(vec![format!("No caregiver is available on {day}.")]);
        }
        let stocks = self.inventory.snapshot().await?;
        let summary = stock_summary(&stocks);
        Ok(caregivers
            .into_iter()
            .map(|caregiver| format!("Caregiver: {caregiver}, {summary}"))
            .collect())
    }

    async fn reserve(&self, day: NaiveDate, vaccine: &str) -> Result<Vec<String>, SchedulerError> {
        let reservation = self.engine.reserve(&self.session, day, vaccine).await?;
        Ok(vec![format!(
            "Appointment ID: {}, Caregiver username: {}",
            reservation.appointment_id, reservation.caregiver
        )])
    }

    async fn upload_availability(&self, day: NaiveDate) -> Result<Vec<String>, SchedulerError> {
        let caregiver = self.session.require_caregiver()?;
        self.calendar.upload(caregiver, day).await?;
        Ok(vec!["Availability uploaded.".to_string()])
    }

    async fn cancel(&self, appointment_id: &str) -> Result<Vec<String>, SchedulerError> {
        self.engine.cancel(&self.session, appointment_id).await?;
        Ok(vec![format!("Appointment {appointment_id} cancelled.")])
    }

    async fn add_doses(&self, vaccine: &str, count: i64) -> Result<Vec<String>, SchedulerError> {
        self.session.require_caregiver()?;
        match self.inventory.fetch(vaccine).await? {
            None => self.inventory.create(vaccine, count).await?,
            Some(_) => self.inventory.increase(vaccine, count).await?,
        }
        Ok(vec!["Doses updated.".to_string()])
    }

    async fn show_appointments(&self) -> Result<Vec<String>, SchedulerError> {
        let (username, role) = self.session.require_authenticated()?;
        let appointments = match role {
            Role::Patient => self.registry.for_patient(username).await?,
            Role::Caregiver => self.registry.for_caregiver(username).await?,
        };
        if appointments.is_empty() {
            return Ok(vec!["No appointments scheduled.".to_string()]);
        }
        Ok(appointments
            .iter()
            .map(|a| appointment_line(a, role))
            .collect())
    }
}

fn stock_summary(stocks: &[VaccineStock]) -> String {
    if stocks.is_empty() {
        return "no vaccines in stock".to_string();
    }
    stocks
        .iter()
        .map(|s| format!("{}: {}", s.name, s.doses))
        .collect::<Vec<_>>()
        .join(", ")
}

fn appointment_line(appointment: &Appointment, viewer: Role) -> String {
    // show the counterparty: patients see the caregiver and vice versa
    match viewer {
        Role::Patient => format!(
            "Appointment ID: {}, vaccine: {}, date: {}, caregiver: {}",
            appointment.id, appointment.vaccine, appointment.day, appointment.caregiver
        ),
        Role::Caregiver => format!(
            "Appointment ID: {}, vaccine: {}, date: {}, patient: {}",
            appointment.id, appointment.vaccine, appointment.day, appointment.patient
        ),
    }
}

/// Read commands from stdin until EOF or `quit`, echoing one prompt per line.
pub async fn run(mut dispatcher: Dispatcher) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();

    out.write_all(b"> ").await?;
    out.flush().await?;
    while let Some(line) = lines.next_line().await? {
        match dispatcher.handle_line(&line).await {
            Reply::Quit => {
                out.write_all(b"Bye!\n").await?;
                out.flush().await?;
                return Ok(());
            }
            Reply::Lines(output) => {
                for l in output {
                    out.write_all(l.as_bytes()).await?;
                    out.write_all(b"\n").await?;
                }
            }
        }
        out.write_all(b"> ").await?;
        out.flush().await?;
    }
    Ok(())
}
