//! Header schema shared by the viewer-request and origin-request stages.
//!
//! The two stages never call each other. The tagging stage writes the marker
//! headers below onto the request and the platform carries them to the routing
//! stage, so both sides must agree on these names.

/// A header as stored on a [`RequestRecord`](crate::edge::RequestRecord).
///
/// `name` is the lower-cased map key, `key` the canonical spelling the
/// platform forwards on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderName {
    pub name: &'static str,
    pub key: &'static str,
}

/// Read by the tagging stage.
pub const USER_AGENT: HeaderName = HeaderName {
    name: "user-agent",
    key: "User-Agent",
};

/// Read by the tagging stage.
pub const HOST: HeaderName = HeaderName {
    name: "host",
    key: "Host",
};

/// Shared secret the prerender service authenticates with.
pub const PRERENDER_TOKEN: HeaderName = HeaderName {
    name: "x-prerender-token",
    key: "X-Prerender-Token",
};

/// Original `Host` value; tells the prerender service which site to render.
pub const PRERENDER_HOST: HeaderName = HeaderName {
    name: "x-prerender-host",
    key: "X-Prerender-Host",
};

/// Per-request unique value that defeats intermediate caches.
pub const PRERENDER_CACHEBUSTER: HeaderName = HeaderName {
    name: "x-prerender-cachebuster",
    key: "X-Prerender-Cachebuster",
};

/// Every header the tagging stage owns.
pub const MARKERS: [HeaderName; 3] = [PRERENDER_TOKEN, PRERENDER_HOST, PRERENDER_CACHEBUSTER];
