//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, shared chrome and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `screens`: per-route content (sign-in, sign-up, dashboard, logout)

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
