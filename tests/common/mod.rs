//! Shared utilities for integration tests.

#![allow(dead_code)]

use prerender_edge::config::{PrerenderConfig, PrerenderToken};
use prerender_edge::edge::{EdgeEvent, RequestRecord};
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "integration-token";

/// Default configuration with a resolved token.
pub fn config() -> PrerenderConfig {
    let mut config = PrerenderConfig::default();
    config.tagger.token = Some(PrerenderToken::new(TEST_TOKEN));
    config
}

/// Viewer request carrying `user-agent` and `host`.
pub fn viewer_request(user_agent: &str, host: &str, uri: &str, query: &str) -> RequestRecord {
    RequestRecord::new(uri, query)
        .with_header("Host", host)
        .with_header("User-Agent", user_agent)
}

/// Platform event JSON as delivered to a viewer-request function.
pub fn viewer_event_json(user_agent: &str, uri: &str, querystring: &str) -> Value {
    json!({
        "Records": [{
            "cf": {
                "config": {
                    "distributionDomainName": "d111111abcdef8.cloudfront.net",
                    "distributionId": "EDFDVBD6EXAMPLE",
                    "eventType": "viewer-request",
                    "requestId": "4TyzHTaYWb1GX1qTfsHhEqV6HUDd_BzoBZnwfnvQc_1oF26ClkoUSEQ=="
                },
                "request": {
                    "clientIp": "203.0.113.178",
                    "method": "GET",
                    "uri": uri,
                    "querystring": querystring,
                    "headers": {
                        "host": [{"key": "Host", "value": "example.com"}],
                        "user-agent": [{"key": "User-Agent", "value": user_agent}],
                        "accept": [{"key": "Accept", "value": "text/html"}]
                    }
                }
            }
        }]
    })
}

/// Wrap a request the way the platform hands it to the next stage.
pub fn event(request: RequestRecord) -> EdgeEvent {
    EdgeEvent::from_request(request)
}
