//! REST API client module for the to-do backend.
//!
//! This module provides the `ApiClient` used by every store. The backend
//! authenticates either with a session cookie plus CSRF header, or with a
//! bearer access token that is renewed once on a 401.

pub mod client;
pub mod error;

pub use client::{ApiClient, TransportMode};
pub use error::ApiError;
