//! Crawler detection and prerender routing for edge request handlers.

pub mod cli;
pub mod config;
pub mod edge;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod markers;
pub mod observability;
pub mod routing;

pub use config::schema::PrerenderConfig;
pub use edge::{EdgeEvent, RequestRecord};
pub use handler::{EdgeHandler, Pipeline, Stage};
pub use routing::{BotTagger, PrerenderRouter};
