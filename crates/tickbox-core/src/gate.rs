//! Access decision for protected screens.
//!
//! `evaluate` is a pure function of `SessionState`. `AccessGate` pairs it with
//! a subscription so callers can re-evaluate whenever the session changes.

use tokio::sync::watch;

use crate::session::{SessionState, SessionStore};

/// Screens the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Dashboard,
    Logout,
}

impl Route {
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// What a protected screen should display right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// The start-up restoration check has not finished. Show a placeholder;
    /// redirecting now would bounce a user whose session is still being restored.
    Verifying,
    /// Signed in; render the protected content.
    Protected,
    /// Signed out; navigate to the given route.
    Redirect(Route),
}

pub fn evaluate(state: &SessionState) -> GateView {
    if state.checking_auth {
        GateView::Verifying
    } else if state.authenticated {
        GateView::Protected
    } else {
        GateView::Redirect(Route::SignIn)
    }
}

/// Reactive wrapper around `evaluate`.
pub struct AccessGate {
    rx: watch::Receiver<SessionState>,
}

impl AccessGate {
    pub fn new(store: &SessionStore) -> Self {
        Self {
            rx: store.subscribe(),
        }
    }

    /// Evaluate against the latest state.
    pub fn current(&self) -> GateView {
        evaluate(&self.rx.borrow())
    }

    /// Wait for the next session change and evaluate against it.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<GateView> {
        self.rx.changed().await.ok()?;
        Some(evaluate(&self.rx.borrow_and_update()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::{ApiClient, TransportMode};
    use crate::auth::TokenCache;

    fn state(checking_auth: bool, authenticated: bool) -> SessionState {
        SessionState {
            authenticated,
            checking_auth,
            ..Default::default()
        }
    }

    fn offline_store() -> SessionStore {
        let api = ApiClient::new(
            "http://127.0.0.1:9",
            TransportMode::Cookie,
            Duration::from_secs(1),
            TokenCache::in_memory(),
        )
        .expect("client");
        SessionStore::new(api)
    }

    #[test]
    fn test_evaluate_table() {
        assert_eq!(evaluate(&state(true, false)), GateView::Verifying);
        assert_eq!(evaluate(&state(true, true)), GateView::Verifying);
        assert_eq!(evaluate(&state(false, true)), GateView::Protected);
        assert_eq!(evaluate(&state(false, false)), GateView::Redirect(Route::SignIn));
    }

    #[test]
    fn test_loading_does_not_affect_gate() {
        let mut s = state(false, false);
        s.loading = true;
        s.error = "Invalid credentials".into();
        assert_eq!(evaluate(&s), GateView::Redirect(Route::SignIn));
    }

    #[test]
    fn test_only_dashboard_requires_session() {
        assert!(Route::Dashboard.requires_session());
        assert!(!Route::SignIn.requires_session());
        assert!(!Route::SignUp.requires_session());
        assert!(!Route::Logout.requires_session());
    }

    #[tokio::test]
    async fn test_gate_follows_store_changes() {
        let store = offline_store();
        let mut gate = AccessGate::new(&store);
        assert_eq!(gate.current(), GateView::Redirect(Route::SignIn));

        store.begin_auth_check();
        assert_eq!(gate.changed().await, Some(GateView::Verifying));

        // Probe against an unreachable server fails and clears the flag.
        store.check_auth().await;
        assert_eq!(gate.current(), GateView::Redirect(Route::SignIn));
    }

    #[tokio::test]
    async fn test_gate_ends_when_store_dropped() {
        let store = offline_store();
        let mut gate = AccessGate::new(&store);
        drop(store);
        assert_eq!(gate.changed().await, None);
    }
}
