//! Platform event model.
//!
//! # Data Flow
//! ```text
//! platform JSON event {"Records":[{"cf":{"config":{..},"request":{..}}}]}
//!     → EdgeEvent (serde)
//!     → RequestRecord of the first record
//!     → handler mutates it in place
//!     → RequestRecord serialized back to the platform
//! ```
//!
//! # Design Decisions
//! - Fields the handlers do not understand are kept verbatim and re-emitted
//! - Headers keep the platform's list-of-entries shape

pub mod headers;
pub mod origin;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use headers::{HeaderEntry, Headers, HeadersExt};
pub use origin::{CustomOrigin, Origin, OriginProtocol, SslProtocol};

/// Error raised when an event does not honour the platform contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("event contains no records")]
    NoRecords,
}

/// Event delivered by the edge platform for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub cf: CloudFrontPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontPayload {
    /// Distribution metadata; opaque to the handlers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    pub request: RequestRecord,
}

impl EdgeEvent {
    /// Wrap a single request the way the platform would deliver it.
    pub fn from_request(request: RequestRecord) -> Self {
        Self {
            records: vec![EdgeRecord {
                cf: CloudFrontPayload {
                    config: None,
                    request,
                },
            }],
        }
    }

    /// Take the request of the first record.
    pub fn into_request(self) -> Result<RequestRecord, EventError> {
        self.records
            .into_iter()
            .next()
            .map(|record| record.cf.request)
            .ok_or(EventError::NoRecords)
    }
}

/// The request a handler inspects and mutates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    #[serde(default)]
    pub headers: Headers,

    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub querystring: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,

    /// Everything else the platform sent (`clientIp`, `method`, `body`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestRecord {
    pub fn new(uri: impl Into<String>, querystring: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            querystring: querystring.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper that appends one header instance.
    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(HeaderEntry::new(key, value));
        self
    }
}
