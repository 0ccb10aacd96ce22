//! Prerender routing subsystem.
//!
//! # Data Flow
//! ```text
//! Viewer request (user-agent, host, uri, querystring)
//!     → tagger.rs (matcher.rs classifies; marker headers attached)
//!     → [platform caching / routing layers]
//! Origin request (marker headers)
//!     → router.rs (origin overridden to the prerender service)
//!     → [platform dispatches upstream]
//! ```
//!
//! # Design Decisions
//! - The stages share only the header schema in `crate::markers`
//! - Classification policy compiled at startup, immutable at runtime
//! - Deterministic apart from the cache-buster value

pub mod cachebuster;
pub mod matcher;
pub mod router;
pub mod tagger;

pub use cachebuster::{CacheBuster, WallClock};
pub use router::{PrerenderRouter, RouteOutcome};
pub use tagger::{BotTagger, TagOutcome, TaggerError};
