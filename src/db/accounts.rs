use crate::db::models::{Account, Role};
use crate::db::sqlite::{SqlitePool, is_unique_violation};
use crate::error::SchedulerError;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Registered accounts, both roles in one table keyed by username.
#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. A taken username is a conflict, not an upsert.
    pub async fn create(&self, account: &Account) -> Result<(), SchedulerError> {
        let res = sqlx::query(
            "INSERT INTO accounts (username, salt, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&account.username)
        .bind(&account.salt)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .execute(&self.pool)
        .await;
        match res {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(SchedulerError::Conflict(format!(
                "username {}",
                account.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn fetch(&self, username: &str) -> Result<Option<Account>, SchedulerError> {
        let row = sqlx::query(
            "SELECT username, salt, password_hash, role FROM accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_account).transpose()
    }
}

fn row_to_account(row: SqliteRow) -> Result<Account, SchedulerError> {
    let username: String = row.try_get("username")?;
    let salt: String = row.try_get("salt")?;
    let password_hash: String = row.try_get("password_hash")?;
    let role_str: String = row.try_get("role")?;
    let role = Role::parse(&role_str)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown role: {role_str}").into()))?;

    Ok(Account {
        username,
        salt,
        password_hash,
        role,
    })
}
