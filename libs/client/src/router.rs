//! Client-side route guard
//!
//! Routes fall in three access classes. Before every navigation the guard
//! compares the target's class with the session state: anonymous users are
//! sent from auth-only pages to the landing page, authenticated users are
//! sent from guest-only pages to their home page. Every navigation emits a
//! notification, whatever the outcome.

use crate::notification::Notifier;
use crate::session::SessionContext;

/// Who may visit a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    GuestOnly,
    AuthOnly,
}

/// Navigable pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Home,
    Search,
    Favorites,
    Profile,
    NotFound,
}

impl Route {
    /// Public landing page for anonymous users
    pub const GUEST_LANDING: Route = Route::Landing;
    /// Landing page for authenticated users
    pub const AUTH_LANDING: Route = Route::Home;

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Home => "/home",
            Route::Search => "/search",
            Route::Favorites => "/favorites",
            Route::Profile => "/profile",
            Route::NotFound => "/404",
        }
    }

    /// Resolve a path, ignoring a query string and trailing slash
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Route::Landing,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/home" => Route::Home,
            "/search" => Route::Search,
            "/favorites" => Route::Favorites,
            "/profile" => Route::Profile,
            _ => Route::NotFound,
        }
    }

    pub fn access(self) -> RouteAccess {
        match self {
            Route::Login | Route::Register => RouteAccess::GuestOnly,
            Route::Home | Route::Favorites | Route::Profile => RouteAccess::AuthOnly,
            Route::Landing | Route::Search | Route::NotFound => RouteAccess::Public,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Landing => "Welcome",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Home => "Home",
            Route::Search => "Search",
            Route::Favorites => "Favorites",
            Route::Profile => "Profile",
            Route::NotFound => "Not Found",
        }
    }
}

/// Guard decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed(Route),
    Redirect(Route),
}

impl Navigation {
    /// Route that ends up displayed
    pub fn route(self) -> Route {
        match self {
            Navigation::Proceed(route) | Navigation::Redirect(route) => route,
        }
    }
}

/// Navigation interceptor
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionContext,
    notifier: Notifier,
}

impl RouteGuard {
    pub fn new(session: SessionContext, notifier: Notifier) -> Self {
        Self { session, notifier }
    }

    /// Decide whether `target` may be shown
    pub fn navigate(&self, target: Route) -> Navigation {
        let authenticated = self.session.is_authenticated();

        let decision = match (target.access(), authenticated) {
            (RouteAccess::AuthOnly, false) => Navigation::Redirect(Route::GUEST_LANDING),
            (RouteAccess::GuestOnly, true) => Navigation::Redirect(Route::AUTH_LANDING),
            _ => Navigation::Proceed(target),
        };

        match decision {
            Navigation::Redirect(_) if authenticated => {
                self.notifier.info("You are already logged in.")
            }
            Navigation::Redirect(_) => self.notifier.warning("Please log in to continue."),
            Navigation::Proceed(route) => self.notifier.info(route.title()),
        }

        decision
    }

    /// Guard a raw path
    pub fn navigate_path(&self, path: &str) -> Navigation {
        self.navigate(Route::from_path(path))
    }
}
