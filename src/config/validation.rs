//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts within platform limits, port non-zero)
//! - Reject empty classification patterns
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PrerenderConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - The token is checked when the tagger is built, so a router-only
//!   deployment can run without it

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PrerenderConfig;

/// Origin timeouts accepted by the edge platform, in seconds.
pub const ORIGIN_TIMEOUT_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

/// A single semantic problem in a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} contains an empty entry at index {index}")]
    EmptyEntry { field: &'static str, index: usize },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("router.port must be non-zero")]
    ZeroPort,

    #[error("router.domain_name '{0}' is not a valid host")]
    InvalidDomain(String),

    #[error("{field} must be within {min}..={max} seconds, got {value}")]
    TimeoutOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("router.path_prefix must start with '/', got '{0}'")]
    RelativePathPrefix(String),

    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &PrerenderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let tagger = &config.tagger;
    check_entries("tagger.bot_signatures", &tagger.bot_signatures, &mut errors);
    check_entries("tagger.static_extensions", &tagger.static_extensions, &mut errors);
    if tagger.escaped_fragment_marker.is_empty() {
        errors.push(ValidationError::Empty {
            field: "tagger.escaped_fragment_marker",
        });
    }
    if tagger.token_env.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "tagger.token_env",
        });
    }

    let router = &config.router;
    if router.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if url::Host::parse(&router.domain_name).is_err() {
        errors.push(ValidationError::InvalidDomain(router.domain_name.clone()));
    }
    check_timeout("router.read_timeout_secs", router.read_timeout_secs, &mut errors);
    check_timeout(
        "router.keepalive_timeout_secs",
        router.keepalive_timeout_secs,
        &mut errors,
    );
    if router.ssl_protocols.is_empty() {
        errors.push(ValidationError::Empty {
            field: "router.ssl_protocols",
        });
    }
    if !router.path_prefix.starts_with('/') {
        errors.push(ValidationError::RelativePathPrefix(router.path_prefix.clone()));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_entries(field: &'static str, values: &[String], errors: &mut Vec<ValidationError>) {
    for (index, value) in values.iter().enumerate() {
        if value.trim().trim_start_matches('.').is_empty() {
            errors.push(ValidationError::EmptyEntry { field, index });
        }
    }
}

fn check_timeout(field: &'static str, value: u32, errors: &mut Vec<ValidationError>) {
    if !ORIGIN_TIMEOUT_RANGE.contains(&value) {
        errors.push(ValidationError::TimeoutOutOfRange {
            field,
            value,
            min: *ORIGIN_TIMEOUT_RANGE.start(),
            max: *ORIGIN_TIMEOUT_RANGE.end(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&PrerenderConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = PrerenderConfig::default();
        config.tagger.bot_signatures.push("  ".into());
        config.tagger.static_extensions.insert(0, ".".into());
        config.router.port = 0;
        config.router.read_timeout_secs = 0;
        config.router.keepalive_timeout_secs = 61;
        config.router.ssl_protocols.clear();
        config.router.path_prefix = "https%3A%2F%2F".into();
        config.server.bind_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();

        assert_eq!(errors.len(), 8);
        assert!(errors.contains(&ValidationError::EmptyEntry {
            field: "tagger.bot_signatures",
            index: 18,
        }));
        assert!(errors.contains(&ValidationError::EmptyEntry {
            field: "tagger.static_extensions",
            index: 0,
        }));
        assert!(errors.contains(&ValidationError::ZeroPort));
        assert!(errors.contains(&ValidationError::Empty {
            field: "router.ssl_protocols",
        }));
        assert!(errors.contains(&ValidationError::InvalidBindAddress("localhost".into())));
    }

    #[test]
    fn test_invalid_domain() {
        let mut config = PrerenderConfig::default();
        config.router.domain_name = "not a host".into();

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidDomain("not a host".into())])
        );
    }

    #[test]
    fn test_empty_marker() {
        let mut config = PrerenderConfig::default();
        config.tagger.escaped_fragment_marker.clear();

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::Empty {
                field: "tagger.escaped_fragment_marker",
            }])
        );
    }
}
