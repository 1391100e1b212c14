use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, TransportMode};
use crate::models::{LoginRequest, RegisterRequest};

/// Shown when a failed login carries no server message.
pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";

/// Shown when a failed registration carries no server message.
pub const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Authentication state shared by every screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The last login or restoration succeeded and nothing has logged out since.
    pub authenticated: bool,
    /// Only true while the start-up restoration check runs.
    pub checking_auth: bool,
    /// A login or registration request is in flight.
    pub loading: bool,
    /// Message from the most recent failed login or registration; empty when none.
    pub error: String,
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// Registration was rejected. `message` is what the user is shown.
    #[error("{message}")]
    Registration {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl SessionError {
    pub fn message(&self) -> &str {
        match self {
            SessionError::Registration { message, .. } => message,
        }
    }
}

/// Prefer the server's own wording; otherwise use the fixed fallback.
fn user_message(err: &ApiError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}

/// Owner of the process-wide `SessionState`.
///
/// Operations take `&self` and may run concurrently from spawned tasks. Each
/// state change is applied atomically between network awaits, so two
/// overlapping logins interleave and the last one to finish wins.
pub struct SessionStore {
    api: ApiClient,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, state }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(f);
    }

    /// Flag the restoration check as running. `check_auth` does this itself;
    /// start-up calls it earlier so no frame sees an unchecked, signed-out state.
    pub fn begin_auth_check(&self) {
        self.update(|s| s.checking_auth = true);
    }

    /// Prime the CSRF cookie. Failures are logged and never reach the caller.
    pub async fn fetch_token(&self) {
        if self.api.mode() != TransportMode::Cookie {
            debug!("Bearer transport, no CSRF cookie to fetch");
            return;
        }
        if let Err(e) = self.api.fetch_csrf().await {
            error!(error = %e, "Failed to fetch CSRF token");
        }
    }

    /// Try to restore a session without user interaction.
    ///
    /// Failure is silent: `authenticated` ends false and `error` is untouched.
    /// `checking_auth` is cleared on every path. Credentials the server
    /// refused are discarded so they are not sent with the next login.
    pub async fn check_auth(&self) {
        self.begin_auth_check();

        let result = self.api.refresh().await;

        if let Err(ref e) = result {
            if e.is_rejection() {
                self.api.discard_credentials();
            }
        }

        self.update(|s| {
            s.authenticated = result.is_ok();
            s.checking_auth = false;
        });

        match result {
            Ok(()) => info!("Session restored"),
            Err(e) => warn!(error = %e, "Auth check failed"),
        }
    }

    /// Log in. Failures are reported only through `error`.
    pub async fn login_user(&self, credentials: LoginRequest) {
        self.update(|s| {
            s.loading = true;
            s.error.clear();
        });

        let result = self.api.login(&credentials).await;
        drop(credentials);

        self.update(|s| {
            match &result {
                Ok(()) => s.authenticated = true,
                Err(e) => s.error = user_message(e, LOGIN_FALLBACK),
            }
            s.loading = false;
        });

        match result {
            Ok(()) => info!("Login successful"),
            Err(e) => warn!(error = %e, "Login failed"),
        }
    }

    /// Register a new account. Does not sign the user in.
    ///
    /// Unlike `login_user`, a failure is also returned so the caller can
    /// branch on it.
    pub async fn register_user(&self, details: RegisterRequest) -> Result<(), SessionError> {
        self.update(|s| {
            s.loading = true;
            s.error.clear();
        });

        let result = self.api.register(&details).await;
        drop(details);

        match result {
            Ok(()) => {
                self.update(|s| s.loading = false);
                info!("Registration successful");
                Ok(())
            }
            Err(source) => {
                let message = user_message(&source, REGISTER_FALLBACK);
                self.update(|s| {
                    s.error = message.clone();
                    s.loading = false;
                });
                error!(error = %source, message = %message, "Registration error");
                Err(SessionError::Registration { message, source })
            }
        }
    }

    /// Log out. The server call is best-effort; local state always ends signed out.
    pub async fn logout_user(&self) {
        if let Err(e) = self.api.logout().await {
            error!(error = %e, "Logout failed");
        }
        self.api.discard_credentials();
        self.update(|s| s.authenticated = false);
        info!("Logged out");
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error.clear());
    }
}
