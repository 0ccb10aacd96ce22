//! HTTP invocation subsystem.
//!
//! # Data Flow
//! ```text
//! POST /invoke/{stage} with a platform event
//!     → server.rs (Axum, tracing, limits)
//!     → Pipeline handler for the stage
//!     → transformed request as JSON
//! ```

pub mod server;

pub use server::{AppState, HttpServer, InvokeError};
