//! Sastra - Main application library
//!
//! This is the binary crate that wires the engine core to the HTTP surface.

mod app;
pub mod presentation;

pub use app::{AppHandle, AppState, create_app};
pub use sastra_core::{Config, init_tracing};

// Re-export for convenience
pub use sastra_core;
pub use sastra_engine;
