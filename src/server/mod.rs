//! HTTP server implementation
//!
//! Route table, handlers and per-route response shaping on top of Axum.

pub mod app;
pub mod handlers;
pub mod shape;

pub use app::{AppState, create_app, create_app_with_state};
pub use shape::{ResponseShape, Surface, full_body};
