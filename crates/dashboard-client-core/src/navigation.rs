use std::cell::RefCell;
use std::fmt;

use tracing::debug;

use crate::session::{SessionContext, SessionStore};
use crate::token::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRoute {
    Login,
    AdminDashboard,
    ManagerDashboard,
    EmployeeDashboard,
}

impl PageRoute {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login.html",
            Self::AdminDashboard => "/admin_dashboard.html",
            Self::ManagerDashboard => "/manager_dashboard.html",
            Self::EmployeeDashboard => "/employee_dashboard.html",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/login.html" => Some(Self::Login),
            "/admin_dashboard.html" => Some(Self::AdminDashboard),
            "/manager_dashboard.html" => Some(Self::ManagerDashboard),
            "/employee_dashboard.html" => Some(Self::EmployeeDashboard),
            _ => None,
        }
    }

    /// Landing page for a role; unknown or missing roles go back to login.
    #[must_use]
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => Self::AdminDashboard,
            Some(Role::Manager) => Self::ManagerDashboard,
            Some(Role::Employee) => Self::EmployeeDashboard,
            None => Self::Login,
        }
    }
}

impl fmt::Display for PageRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Client-side page navigation (a full page load in the browser).
pub trait Navigator {
    fn navigate(&self, route: PageRoute);
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn navigate(&self, route: PageRoute) {
        (**self).navigate(route);
    }
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: RefCell<Vec<PageRoute>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<PageRoute> {
        self.visited.borrow().clone()
    }

    pub fn last(&self) -> Option<PageRoute> {
        self.visited.borrow().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: PageRoute) {
        self.visited.borrow_mut().push(route);
    }
}

impl<S: SessionStore> SessionContext<S> {
    /// Sends the visitor to login when no token is stored. Token validity is
    /// not checked. Returns whether a redirect happened.
    pub fn protect_page(&self, navigator: &impl Navigator) -> bool {
        if self.has_token() {
            return false;
        }
        debug!("no session token; redirecting to login");
        navigator.navigate(PageRoute::Login);
        true
    }

    /// Clears the token and always redirects to login, even when the clear
    /// fails or no token was stored.
    pub fn logout(&self, navigator: &impl Navigator) {
        if let Err(error) = self.clear_token() {
            tracing::warn!(%error, "failed to clear session token during logout");
        }
        navigator.navigate(PageRoute::Login);
    }

    /// Redirects to the landing page for the decoded role and returns it.
    pub fn redirect_to_dashboard(&self, navigator: &impl Navigator) -> PageRoute {
        let route = self.dashboard_route();
        debug!(route = route.path(), "redirecting to role dashboard");
        navigator.navigate(route);
        route
    }

    /// Landing page for the current session without navigating.
    pub fn dashboard_route(&self) -> PageRoute {
        PageRoute::for_role(self.current_user().and_then(|user| user.role()))
    }
}
