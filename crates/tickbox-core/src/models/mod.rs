//! Wire types exchanged with the to-do backend.
//!
//! - `LoginRequest`, `RegisterRequest`: credential payloads
//! - `TokenPair`, `RefreshRequest`: bearer token exchange
//! - `Todo`, `NewTodo`, `Filter`: to-do items and list filtering

pub mod credentials;
pub mod todo;

pub use credentials::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, TokenPair};
pub use todo::{Filter, NewTodo, Todo};
