//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both edge stages
//! and the local invocation server. All types derive Serde traits for
//! deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::edge::{OriginProtocol, SslProtocol};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PrerenderConfig {
    /// Viewer-request stage (bot tagging).
    pub tagger: TaggerConfig,

    /// Origin-request stage (prerender origin override).
    pub router: RouterConfig,

    /// Local invocation server.
    pub server: ServerConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Authentication token for the prerender service.
///
/// Never serialized, and redacted from `Debug`/`Display` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PrerenderToken(String);

impl PrerenderToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for PrerenderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrerenderToken(***)")
    }
}

impl fmt::Display for PrerenderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Bot tagging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Environment variable holding the prerender token.
    pub token_env: String,

    /// Token resolved at load time. The environment variable wins over a value
    /// in the file.
    #[serde(skip_serializing)]
    pub token: Option<PrerenderToken>,

    /// User-agent substrings identifying crawlers and link-preview bots.
    pub bot_signatures: Vec<String>,

    /// URI extensions that are never prerendered.
    pub static_extensions: Vec<String>,

    /// Query-string marker of the AJAX crawling scheme.
    pub escaped_fragment_marker: String,
}

pub const DEFAULT_TOKEN_ENV: &str = "PRERENDER_TOKEN";

pub const DEFAULT_BOT_SIGNATURES: &[&str] = &[
    "bot",
    "googlebot",
    "bingbot",
    "yandex",
    "baiduspider",
    "facebot",
    "facebookexternalhit",
    "twitterbot",
    "rogerbot",
    "linkedinbot",
    "embedly",
    "quora link preview",
    "showyoubot",
    "outbrain",
    "pinterest",
    "slackbot",
    "vkshare",
    "w3c_validator",
];

pub const DEFAULT_STATIC_EXTENSIONS: &[&str] = &[
    "js", "css", "xml", "less", "png", "jpg", "jpeg", "gif", "pdf", "doc", "txt", "ico", "rss",
    "zip", "mp3", "rar", "exe", "wmv", "avi", "ppt", "mpg", "mpeg", "tif", "wav", "mov", "psd",
    "ai", "xls", "mp4", "m4a", "swf", "dat", "dmg", "iso", "flv", "m4v", "torrent", "ttf",
    "woff", "svg", "eot", "woff2",
];

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            token: None,
            bot_signatures: DEFAULT_BOT_SIGNATURES.iter().map(|s| s.to_string()).collect(),
            static_extensions: DEFAULT_STATIC_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            escaped_fragment_marker: "_escaped_fragment_".to_string(),
        }
    }
}

/// Prerender origin override configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prerender service host.
    pub domain_name: String,

    pub port: u16,

    pub protocol: OriginProtocol,

    /// Origin read timeout in seconds.
    pub read_timeout_secs: u32,

    /// Origin keep-alive timeout in seconds.
    pub keepalive_timeout_secs: u32,

    /// TLS versions allowed towards the prerender service.
    pub ssl_protocols: Vec<SslProtocol>,

    /// Prefix of the forwarded path; the encoded host is appended to it.
    pub path_prefix: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            domain_name: "service.prerender.io".to_string(),
            port: 443,
            protocol: OriginProtocol::Https,
            read_timeout_secs: 20,
            keepalive_timeout_secs: 5,
            ssl_protocols: vec![SslProtocol::TlsV1_2],
            path_prefix: "/https%3A%2F%2F".to_string(),
        }
    }
}

/// Local invocation server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:9000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted event size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9000".to_string(),
            request_timeout_secs: 5,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}
