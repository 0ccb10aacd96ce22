//! Origin override descriptors.
//!
//! Setting `origin` on a request tells the platform's routing layer which
//! upstream to contact instead of the distribution's configured one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::edge::headers::Headers;

/// Upstream selection, externally tagged as on the wire:
/// `{"custom": {...}}` or `{"s3": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Custom(CustomOrigin),
    /// Bucket origins are passed through untouched.
    S3(serde_json::Value),
}

impl Origin {
    pub fn as_custom(&self) -> Option<&CustomOrigin> {
        match self {
            Origin::Custom(custom) => Some(custom),
            Origin::S3(_) => None,
        }
    }
}

/// A custom HTTP(S) upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrigin {
    pub domain_name: String,
    pub port: u16,
    pub protocol: OriginProtocol,
    /// Seconds.
    pub read_timeout: u32,
    /// Seconds.
    pub keepalive_timeout: u32,
    #[serde(default)]
    pub custom_headers: Headers,
    pub ssl_protocols: Vec<SslProtocol>,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginProtocol {
    Http,
    Https,
}

impl fmt::Display for OriginProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginProtocol::Http => f.write_str("http"),
            OriginProtocol::Https => f.write_str("https"),
        }
    }
}

/// TLS versions the platform may negotiate with a custom origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SslProtocol {
    #[serde(rename = "SSLv3")]
    SslV3,
    #[serde(rename = "TLSv1")]
    TlsV1,
    #[serde(rename = "TLSv1.1")]
    TlsV1_1,
    #[serde(rename = "TLSv1.2")]
    TlsV1_2,
}

impl SslProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslProtocol::SslV3 => "SSLv3",
            SslProtocol::TlsV1 => "TLSv1",
            SslProtocol::TlsV1_1 => "TLSv1.1",
            SslProtocol::TlsV1_2 => "TLSv1.2",
        }
    }

    /// Versions below TLS 1.2.
    pub fn is_legacy(&self) -> bool {
        *self < SslProtocol::TlsV1_2
    }
}

impl fmt::Display for SslProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SSLv3" => Ok(SslProtocol::SslV3),
            "TLSv1" => Ok(SslProtocol::TlsV1),
            "TLSv1.1" => Ok(SslProtocol::TlsV1_1),
            "TLSv1.2" => Ok(SslProtocol::TlsV1_2),
            other => Err(format!("unknown SSL protocol '{}'", other)),
        }
    }
}
