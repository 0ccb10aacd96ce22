//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{PrerenderConfig, PrerenderToken};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment
/// overrides.
pub fn load_config(path: &Path) -> Result<PrerenderConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |name| std::env::var(name).ok())
}

/// Built-in defaults plus environment overrides, for deployments without a file.
pub fn load_from_env() -> Result<PrerenderConfig, ConfigError> {
    let mut config = PrerenderConfig::default();
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    normalize_config(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse and validate a TOML document, resolving overrides through `lookup`.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<PrerenderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: PrerenderConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, lookup);
    normalize_config(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the prerender token from the variable named by `tagger.token_env`.
pub fn apply_env_overrides<F>(config: &mut PrerenderConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(&config.tagger.token_env) {
        let token = PrerenderToken::new(value.trim());
        if !token.is_empty() {
            config.tagger.token = Some(token);
        }
    }
}

/// Canonical forms: extensions trimmed, lower-case, without the leading dot.
pub fn normalize_config(config: &mut PrerenderConfig) {
    for extension in &mut config.tagger.static_extensions {
        *extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    }
}
