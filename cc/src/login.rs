//! Login form validation and the login flow

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::CatalogError;
use crate::guard::Route;
use crate::session::{AuthApi, SessionStore, User};

const MIN_FIELD_LEN: usize = 3;

/// Credentials entered on the login screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

/// A form field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
}

impl Field {
    fn label(&self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Password => "Password",
        }
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{} is required", .0.label())]
    Required(Field),

    #[error("{} must be at least 3 characters long", .0.label())]
    TooShort(Field),
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required(f) | FieldError::TooShort(f) => *f,
        }
    }
}

/// Login failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Invalid form: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<FieldError>),

    #[error("{0}")]
    Rejected(#[from] CatalogError),
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    pub fn remember_me(mut self, remember: bool) -> Self {
        self.remember_me = remember;
        self
    }

    /// Every field problem, username first
    pub fn validate(&self) -> Vec<FieldError> {
        debug!("LoginForm::validate: called");
        [(Field::Username, &self.username), (Field::Password, &self.password)]
            .into_iter()
            .filter_map(|(field, value)| check_field(field, value))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Message to show under one field, if any
    pub fn field_error(&self, field: Field) -> Option<String> {
        self.validate()
            .into_iter()
            .find(|e| e.field() == field)
            .map(|e| e.to_string())
    }
}

fn check_field(field: Field, value: &str) -> Option<FieldError> {
    if value.is_empty() {
        Some(FieldError::Required(field))
    } else if value.chars().count() < MIN_FIELD_LEN {
        Some(FieldError::TooShort(field))
    } else {
        None
    }
}

/// A successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub redirect: Route,
    pub remember_me: bool,
}

/// Where to send a user who opens the login screen while already logged in
pub fn existing_session_redirect(session: &dyn SessionStore) -> Option<Route> {
    session.current_user().map(|u| Route::home_for(u.role))
}

/// Validate, authenticate, store the user and pick the landing screen
pub async fn login(
    auth: &dyn AuthApi,
    session: &dyn SessionStore,
    form: &LoginForm,
) -> Result<LoginOutcome, LoginError> {
    debug!(username = %form.username, "login: called");
    let problems = form.validate();
    if !problems.is_empty() {
        debug!(count = problems.len(), "login: form invalid");
        return Err(LoginError::Invalid(problems));
    }

    let user = match auth.login(&form.username, &form.password).await {
        Ok(user) => user,
        Err(e) => {
            warn!(username = %form.username, error = %e, "login: rejected");
            return Err(e.into());
        }
    };

    let redirect = Route::home_for(user.role);
    session.set_current_user(user.clone());
    info!(username = %user.username, %redirect, "login: succeeded");

    Ok(LoginOutcome {
        user,
        redirect,
        remember_me: form.remember_me,
    })
}
