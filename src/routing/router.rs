//! Origin-request stage: send tagged requests to the prerender service.
//!
//! # Responsibilities
//! - Detect the marker headers written by the viewer-request stage
//! - Override the request origin with the prerender service descriptor
//!
//! # Design Decisions
//! - Both `x-prerender-token` and `x-prerender-host` must be present
//! - The original host travels in the forwarded path, percent-encoded
//! - Untagged requests keep whatever origin they already had

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::RouterConfig;
use crate::edge::{CustomOrigin, Headers, HeadersExt, Origin, RequestRecord};
use crate::handler::{EdgeHandler, Stage};
use crate::markers;

/// Characters left unescaped by URI component encoding.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// What the router decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Origin replaced with the prerender service.
    Prerender,
    /// Marker headers absent; origin untouched.
    Passthrough,
}

/// Redirects tagged requests to the prerender service.
#[derive(Debug, Clone)]
pub struct PrerenderRouter {
    template: CustomOrigin,
}

impl PrerenderRouter {
    pub fn from_config(config: &RouterConfig) -> Self {
        if config.ssl_protocols.iter().any(|p| p.is_legacy()) {
            tracing::warn!(
                ssl_protocols = ?config.ssl_protocols,
                "Prerender origin allows TLS versions below 1.2"
            );
        }

        Self {
            template: CustomOrigin {
                domain_name: config.domain_name.clone(),
                port: config.port,
                protocol: config.protocol,
                read_timeout: config.read_timeout_secs,
                keepalive_timeout: config.keepalive_timeout_secs,
                custom_headers: Headers::new(),
                ssl_protocols: config.ssl_protocols.clone(),
                path: config.path_prefix.clone(),
            },
        }
    }

    /// Origin descriptor for a request tagged with `host`.
    pub fn origin_for(&self, host: &str) -> Origin {
        let mut origin = self.template.clone();
        origin.path.extend(utf8_percent_encode(host, COMPONENT));
        Origin::Custom(origin)
    }

    /// Override the origin of tagged requests.
    pub fn route(&self, request: &mut RequestRecord) -> RouteOutcome {
        let headers = &request.headers;
        let host = match (
            headers.first_value(markers::PRERENDER_TOKEN),
            headers.first_value(markers::PRERENDER_HOST),
        ) {
            (Some(_), Some(host)) => host.to_string(),
            _ => {
                tracing::debug!(uri = %request.uri, "Origin request passed through");
                return RouteOutcome::Passthrough;
            }
        };

        request.origin = Some(self.origin_for(&host));
        tracing::debug!(
            uri = %request.uri,
            host = %host,
            domain = %self.template.domain_name,
            "Origin request routed to prerender service"
        );
        RouteOutcome::Prerender
    }
}

impl EdgeHandler for PrerenderRouter {
    fn stage(&self) -> Stage {
        Stage::OriginRequest
    }

    fn handle(&self, mut request: RequestRecord) -> RequestRecord {
        self.route(&mut request);
        request
    }
}
