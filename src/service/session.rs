use crate::db::models::Role;
use crate::error::SchedulerError;

/// Identity of the caller issuing a command.
///
/// Each logical session owns its own value; there is no process-global
/// current user. At most one account is authenticated at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionContext {
    #[default]
    Anonymous,
    Authenticated {
        username: String,
        role: Role,
    },
}

impl SessionContext {
    pub fn patient(username: impl Into<String>) -> Self {
        Self::Authenticated {
            username: username.into(),
            role: Role::Patient,
        }
    }

    pub fn caregiver(username: impl Into<String>) -> Self {
        Self::Authenticated {
            username: username.into(),
            role: Role::Caregiver,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { username, .. } => Some(username),
        }
    }

    /// The authenticated username and role, or a login-required failure.
    pub fn require_authenticated(&self) -> Result<(&str, Role), SchedulerError> {
        match self {
            Self::Anonymous => Err(SchedulerError::LoginRequired),
            Self::Authenticated { username, role } => Ok((username, *role)),
        }
    }

    /// The patient username, or a role failure.
    pub fn require_patient(&self) -> Result<&str, SchedulerError> {
        match self.require_authenticated()? {
            (username, Role::Patient) => Ok(username),
            _ => Err(SchedulerError::WrongRole(Role::Patient)),
        }
    }

    /// The caregiver username, or a role failure.
    pub fn require_caregiver(&self) -> Result<&str, SchedulerError> {
        match self.require_authenticated()? {
            (username, Role::Caregiver) => Ok(username),
            _ => Err(SchedulerError::WrongRole(Role::Caregiver)),
        }
    }
}
