//! Route guards deciding which screen a session may see

use std::fmt;

use tracing::debug;

use crate::session::{Role, SessionStore};

/// Screens of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    AdminDashboard,
    UserDashboard,
}

impl Route {
    /// Resolve a path; anything unknown lands on the login screen
    pub fn resolve(path: &str) -> Self {
        debug!(%path, "Route::resolve: called");
        match path.trim_matches('/') {
            "admin-dashboard" => Route::AdminDashboard,
            "user-dashboard" => Route::UserDashboard,
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::AdminDashboard => "/admin-dashboard",
            Route::UserDashboard => "/user-dashboard",
        }
    }

    /// Dashboard a freshly logged-in user is sent to
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Admin => Route::AdminDashboard,
            _ => Route::UserDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

/// Guard for the user dashboard
pub fn user_guard(session: &dyn SessionStore) -> Access {
    debug!("user_guard: called");
    if !session.is_logged_in() {
        return Access::Redirect(Route::Login);
    }
    match session.role() {
        Role::User => Access::Allow,
        Role::Admin => Access::Redirect(Route::AdminDashboard),
        Role::Anonymous => Access::Redirect(Route::Login),
    }
}

/// Guard for the admin dashboard
pub fn admin_guard(session: &dyn SessionStore) -> Access {
    debug!("admin_guard: called");
    if !session.is_logged_in() {
        return Access::Redirect(Route::Login);
    }
    match session.role() {
        Role::Admin => Access::Allow,
        Role::User => Access::Redirect(Route::UserDashboard),
        Role::Anonymous => Access::Redirect(Route::Login),
    }
}

/// Screen actually shown when navigating to `path`
pub fn navigate(session: &dyn SessionStore, path: &str) -> Route {
    let route = Route::resolve(path);
    let access = match route {
        Route::Login => Access::Allow,
        Route::AdminDashboard => admin_guard(session),
        Route::UserDashboard => user_guard(session),
    };
    match access {
        Access::Allow => route,
        Access::Redirect(to) => to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InMemorySession, User};

    fn session(role: Option<Role>) -> InMemorySession {
        let session = InMemorySession::new();
        if let Some(role) = role {
            session.set_current_user(User {
                id: 1,
                username: "someone".to_string(),
                role,
            });
        }
        session
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Route::resolve("/admin-dashboard"), Route::AdminDashboard);
        assert_eq!(Route::resolve("user-dashboard"), Route::UserDashboard);
        assert_eq!(Route::resolve("/login"), Route::Login);
        assert_eq!(Route::resolve(""), Route::Login);
        assert_eq!(Route::resolve("/nope"), Route::Login);
    }

    #[test]
    fn test_user_guard() {
        assert_eq!(user_guard(&session(None)), Access::Redirect(Route::Login));
        assert_eq!(user_guard(&session(Some(Role::User))), Access::Allow);
        assert_eq!(
            user_guard(&session(Some(Role::Admin))),
            Access::Redirect(Route::AdminDashboard)
        );
        assert_eq!(
            user_guard(&session(Some(Role::Anonymous))),
            Access::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_admin_guard() {
        assert_eq!(admin_guard(&session(None)), Access::Redirect(Route::Login));
        assert_eq!(admin_guard(&session(Some(Role::Admin))), Access::Allow);
        assert_eq!(
            admin_guard(&session(Some(Role::User))),
            Access::Redirect(Route::UserDashboard)
        );
    }

    #[test]
    fn test_navigate() {
        let admin = session(Some(Role::Admin));
        assert_eq!(navigate(&admin, "/user-dashboard"), Route::AdminDashboard);
        assert_eq!(navigate(&admin, "/admin-dashboard"), Route::AdminDashboard);
        assert_eq!(navigate(&session(None), "/admin-dashboard"), Route::Login);
        assert_eq!(navigate(&session(None), "/whatever"), Route::Login);
    }

    #[test]
    fn test_home_for() {
        assert_eq!(Route::home_for(Role::Admin), Route::AdminDashboard);
        assert_eq!(Route::home_for(Role::User), Route::UserDashboard);
        assert_eq!(Route::home_for(Role::Anonymous), Route::UserDashboard);
    }
}
