//! Token material for the bearer transport.
//!
//! `TokenCache` holds the access/refresh pair issued by the backend and
//! mirrors it to `tokens.json` in the cache directory so a later run can
//! restore the session. The cookie transport never touches it.

pub mod tokens;

pub use tokens::{TokenCache, Tokens};
