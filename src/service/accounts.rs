use crate::db::accounts::AccountStore;
use crate::db::models::{Account, Role};
use crate::error::SchedulerError;
use crate::service::session::SessionContext;
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use tracing::info;

/// Registration and login on top of the account store.
#[derive(Clone)]
pub struct AccountService {
    store: AccountStore,
}

impl AccountService {
    pub fn new(store: AccountStore) -> Self {
        Self { store }
    }

    /// Register a new account with a fresh salt and an Argon2id hash.
    /// A taken username is a conflict.
    pub async fn register(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<(), SchedulerError> {
        if username.is_empty() || password.is_empty() {
            return Err(SchedulerError::Validation(
                "username and password must be non-empty".to_string(),
            ));
        }
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = hash_password(password, &salt)?;
        let account = Account {
            username: username.to_string(),
            salt: salt.to_string(),
            password_hash,
            role,
        };
        self.store.create(&account).await?;
        info!(username, role = %role, "account created");
        Ok(())
    }

    /// Verify credentials for the requested role and produce an authenticated
    /// session. Every mismatch (unknown user, wrong role, wrong password)
    /// collapses to the same generic failure so usernames cannot be probed.
    pub async fn login(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<SessionContext, SchedulerError> {
        let Some(account) = self.store.fetch(username).await? else {
            return Err(SchedulerError::LoginFailed);
        };
        if account.role != role || !verify_password(password, &account.password_hash)? {
            return Err(SchedulerError::LoginFailed);
        }
        info!(username, role = %role, "logged in");
        Ok(SessionContext::Authenticated {
            username: account.username,
            role,
        })
    }
}

fn hash_password(password: &str, salt: &SaltString) -> Result<String, SchedulerError> {
    Argon2::default()
        .hash_password(password.as_bytes(), salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SchedulerError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> Result<bool, SchedulerError> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| SchedulerError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
