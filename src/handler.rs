//! Edge handler contract.
//!
//! The platform invokes a handler with one event and expects one request back.
//! Handlers are stateless across invocations and never fail; only an event that
//! carries no request at all is rejected.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::PrerenderConfig;
use crate::edge::{EdgeEvent, EventError, RequestRecord};
use crate::routing::{BotTagger, PrerenderRouter, TaggerError};

/// A single-pass request transformation run by the edge platform.
pub trait EdgeHandler: Send + Sync {
    /// Pipeline stage this handler is attached to.
    fn stage(&self) -> Stage;

    /// Transform one request.
    fn handle(&self, request: RequestRecord) -> RequestRecord;

    /// Unwrap the platform event and transform its request.
    fn handle_event(&self, event: EdgeEvent) -> Result<RequestRecord, EventError> {
        Ok(self.handle(event.into_request()?))
    }
}

/// Point in the request path where a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Stage {
    /// Before the cache; runs the [`BotTagger`].
    ViewerRequest,
    /// After a cache miss, before the origin; runs the [`PrerenderRouter`].
    OriginRequest,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown stage '{0}' (expected viewer-request or origin-request)")]
pub struct UnknownStage(pub String);

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ViewerRequest => "viewer-request",
            Stage::OriginRequest => "origin-request",
        }
    }

    /// Build only the handler for this stage.
    pub fn build(&self, config: &PrerenderConfig) -> Result<Box<dyn EdgeHandler>, TaggerError> {
        match self {
            Stage::ViewerRequest => Ok(Box::new(BotTagger::from_config(&config.tagger)?)),
            Stage::OriginRequest => Ok(Box::new(PrerenderRouter::from_config(&config.router))),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer-request" => Ok(Stage::ViewerRequest),
            "origin-request" => Ok(Stage::OriginRequest),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

/// Both stages compiled from one configuration.
#[derive(Debug)]
pub struct Pipeline {
    tagger: BotTagger,
    router: PrerenderRouter,
}

impl Pipeline {
    pub fn new(tagger: BotTagger, router: PrerenderRouter) -> Self {
        Self { tagger, router }
    }

    pub fn from_config(config: &PrerenderConfig) -> Result<Self, TaggerError> {
        Ok(Self::new(
            BotTagger::from_config(&config.tagger)?,
            PrerenderRouter::from_config(&config.router),
        ))
    }

    pub fn handler(&self, stage: Stage) -> &dyn EdgeHandler {
        match stage {
            Stage::ViewerRequest => &self.tagger,
            Stage::OriginRequest => &self.router,
        }
    }

    pub fn invoke(&self, stage: Stage, event: EdgeEvent) -> Result<RequestRecord, EventError> {
        self.handler(stage).handle_event(event)
    }
}
