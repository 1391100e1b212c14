//! To-do list store.
//!
//! Mirrors the signed-in user's items and forwards every change to the
//! backend. Like the session store it publishes its state through a watch
//! channel so screens can read it without holding a lock.

pub mod store;

pub use store::{TodoState, TodoStore};
