//! s3deck server library
//!
//! This module exports the HTTP surface for use in integration tests.

pub mod args;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use args::Args;
pub use routes::app;
pub use state::AppState;
