//! Core library for tickbox.
//!
//! Everything the terminal client needs that is not drawing:
//!
//! - `api`: HTTP adapter for the to-do backend (cookie or bearer transport)
//! - `auth`: bearer token cache
//! - `session`: the authentication state machine
//! - `gate`: access decision for protected screens
//! - `bootstrap`: start-up session restoration
//! - `todos`: to-do list store
//! - `config`: persisted settings and environment overrides

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod gate;
pub mod models;
pub mod session;
pub mod todos;

pub use api::{ApiClient, ApiError, TransportMode};
pub use bootstrap::{bootstrap, spawn_bootstrap};
pub use config::Config;
pub use gate::{evaluate, AccessGate, GateView, Route};
pub use session::{SessionError, SessionState, SessionStore};
pub use todos::{TodoState, TodoStore};
