//! Route table and the authorization gate in front of protected routes.
//!
//! The gate is a pure function of the session state and the requested
//! path; [`AuthGate::resolve`] only adds the wait for the initial session.

use tokio::sync::watch;

use crate::constants::{
    PATH_ADD_EXPORT, PATH_ALL_PRODUCTS, PATH_HOME, PATH_LOGIN, PATH_MY_EXPORTS, PATH_MY_IMPORTS, PATH_PRODUCT_DETAILS,
    PATH_PROFILE, PATH_REGISTER,
};
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    AllProducts,
    ProductDetails(String),
    AddExport,
    MyExports,
    MyImports,
    Profile,
    Login,
    Register,
    NotFound(String),
}

impl Route {
    /// Match a path, ignoring any query string, fragment or trailing slash
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { PATH_HOME } else { trimmed };

        if let Some(id) = normalized
            .strip_prefix(PATH_PRODUCT_DETAILS)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            if !id.is_empty() && !id.contains('/') {
                return Route::ProductDetails(id.to_string());
            }
        }

        match normalized {
            PATH_HOME => Route::Home,
            PATH_ALL_PRODUCTS => Route::AllProducts,
            PATH_ADD_EXPORT => Route::AddExport,
            PATH_MY_EXPORTS => Route::MyExports,
            PATH_MY_IMPORTS => Route::MyImports,
            PATH_PROFILE => Route::Profile,
            PATH_LOGIN => Route::Login,
            PATH_REGISTER => Route::Register,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => PATH_HOME.to_string(),
            Route::AllProducts => PATH_ALL_PRODUCTS.to_string(),
            Route::ProductDetails(id) => format!("{PATH_PRODUCT_DETAILS}/{id}"),
            Route::AddExport => PATH_ADD_EXPORT.to_string(),
            Route::MyExports => PATH_MY_EXPORTS.to_string(),
            Route::MyImports => PATH_MY_IMPORTS.to_string(),
            Route::Profile => PATH_PROFILE.to_string(),
            Route::Login => PATH_LOGIN.to_string(),
            Route::Register => PATH_REGISTER.to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Requires a signed-in identity
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::ProductDetails(_) | Route::AddExport | Route::MyExports | Route::MyImports | Route::Profile
        )
    }

    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The session is still resolving; render a loading indicator
    Loading,
    Allow(Route),
    /// Send the user to `to`, remembering the path they asked for
    Redirect { to: String, from: String },
}

pub struct AuthGate;

impl AuthGate {
    pub fn decide(state: &SessionState, path: &str) -> GateDecision {
        let route = Route::parse(path);

        match state {
            SessionState::Resolving => GateDecision::Loading,
            SessionState::SignedIn(identity) if identity.has_valid_email() => GateDecision::Allow(route),
            _ if route.is_protected() => GateDecision::Redirect {
                to: PATH_LOGIN.to_string(),
                from: path.to_string(),
            },
            _ => GateDecision::Allow(route),
        }
    }

    /// Wait for the initial session, then decide.
    ///
    /// A closed channel is treated as signed out.
    pub async fn resolve(mut session: watch::Receiver<SessionState>, path: &str) -> GateDecision {
        let state = match session.wait_for(SessionState::is_resolved).await {
            Ok(state) => state.clone(),
            Err(_) => SessionState::SignedOut,
        };
        Self::decide(&state, path)
    }
}

/// Where to navigate after a successful sign-in.
///
/// Only paths local to the app are honored; anything with a scheme or a
/// host falls back to home.
pub fn return_path(from: Option<&str>) -> String {
    match from.map(str::trim).filter(|path| is_local_path(path)) {
        Some(path) if !Route::parse(path).is_auth_page() => path.to_string(),
        _ => PATH_HOME.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains("://") && !path.contains('\\')
}
