//! Start-up session restoration.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::SessionStore;

/// Prime the CSRF cookie, then try to restore the session. Run once per process.
pub async fn bootstrap(store: &SessionStore) {
    debug!("Bootstrap: fetching CSRF token");
    store.fetch_token().await;
    debug!("Bootstrap: checking for an existing session");
    store.check_auth().await;
    info!(authenticated = store.snapshot().authenticated, "Bootstrap complete");
}

/// Run `bootstrap` on a background task so the first frame is never delayed.
///
/// The store is flagged as checking before the task starts, which keeps the
/// access gate on its placeholder for the whole bootstrap.
pub fn spawn_bootstrap(store: Arc<SessionStore>) -> JoinHandle<()> {
    store.begin_auth_check();
    tokio::spawn(async move { bootstrap(&store).await })
}
