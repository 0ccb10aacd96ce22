//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, server, config watcher
//!     → tracing events with structured fields
//!     → logging.rs subscriber (pretty or JSON, EnvFilter)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Handler decisions logged at debug level; hot path stays quiet at info
//! - The server adds request spans through tower-http's TraceLayer

pub mod logging;

pub use logging::init_logging;
