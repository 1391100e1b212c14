//! Authentication session lifecycle.
//!
//! `SessionStore` owns the single `SessionState` for the process and exposes
//! the operations that move it: CSRF priming, silent restoration at start-up,
//! login, registration, logout and error clearing. Readers either take a
//! `snapshot()` or `subscribe()` to be told about every change.

pub mod store;

pub use store::{SessionError, SessionState, SessionStore, LOGIN_FALLBACK, REGISTER_FALLBACK};
