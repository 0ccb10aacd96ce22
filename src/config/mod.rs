//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse, resolve token from environment, normalize)
//!     → validation.rs (semantic checks)
//!     → PrerenderConfig (validated, immutable)
//!     → handlers compiled from it
//!
//! On file change (serve --watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps in a freshly built Pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The prerender token is only ever read from configuration, never compiled in

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, normalize_config, ConfigError};
pub use schema::{
    LogFormat, ObservabilityConfig, PrerenderConfig, PrerenderToken, RouterConfig, ServerConfig,
    TaggerConfig,
};
pub use validation::ValidationError;
