//! Session state: who is logged in and with which role

use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::CatalogError;

/// Access level of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
    Anonymous,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Anonymous => "ANONYMOUS",
        };
        write!(f, "{}", s)
    }
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

/// Where the current user is remembered between screens
pub trait SessionStore: Send + Sync {
    fn current_user(&self) -> Option<User>;

    fn set_current_user(&self, user: User);

    fn logout(&self);

    fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Role of the current user, `Anonymous` when nobody is logged in
    fn role(&self) -> Role {
        self.current_user().map(|u| u.role).unwrap_or(Role::Anonymous)
    }
}

/// Authentication backend
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<User, CatalogError>;
}

/// Process-local session
#[derive(Debug, Default)]
pub struct InMemorySession {
    user: Mutex<Option<User>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySession {
    fn current_user(&self) -> Option<User> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_current_user(&self, user: User) {
        info!(username = %user.username, role = %user.role, "InMemorySession: user logged in");
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    fn logout(&self) {
        debug!("InMemorySession::logout: called");
        self.user.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
