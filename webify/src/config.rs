//! TOML configuration.
//!
//! ```toml
//! [webify]
//! key_prefix = "webify"
//!
//! [redis]
//! url = "${REDIS_URL}"
//! ```
//!
//! `${VAR}` placeholders are expanded from the environment when the file is
//! loaded. An unset `REDIS_URL` falls back to a local Redis.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "webify.toml";
pub const DEFAULT_KEY_PREFIX: &str = "webify";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebifyConfig {
    #[serde(default)]
    pub webify: WebifySettings,
    #[serde(default)]
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebifySettings {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for WebifySettings {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

impl WebifyConfig {
    /// Loads `path`, or `webify.toml` from the working directory when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Self::default().resolve_with(env_lookup);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WebifyConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        debug!("loaded configuration from {}", path.display());
        config.resolve_with(env_lookup)
    }

    /// Parses TOML text and expands placeholders from the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WebifyConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            origin: "inline configuration".to_string(),
            source,
        })?;
        config.resolve_with(env_lookup)
    }

    /// Expands every placeholder using `lookup`.
    pub fn resolve_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        self.webify.key_prefix = expand_placeholders(&self.webify.key_prefix, &lookup)?;
        self.redis.url = match expand_placeholders(&self.redis.url, &lookup) {
            Ok(url) => url,
            Err(ConfigError::MissingEnv { name }) if name == "REDIS_URL" => {
                warn!("REDIS_URL is not set, falling back to {DEFAULT_REDIS_URL}");
                DEFAULT_REDIS_URL.to_string()
            }
            Err(err) => return Err(err),
        };
        Ok(self)
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Replaces each `${NAME}` in `value` with `lookup(NAME)`.
pub fn expand_placeholders(value: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| ConfigError::Unterminated {
            value: value.to_string(),
        })?;
        let name = &after[..end];
        let replacement = lookup(name).ok_or_else(|| ConfigError::MissingEnv { name: name.to_string() })?;
        expanded.push_str(&replacement);
        rest = &after[end + 1..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "REDIS_HOST" => Some("cache.internal".to_string()),
            "TENANT" => Some("acme".to_string()),
            _ => None,
        }
    }

    #[test]
    fn defaults_fall_back_to_local_redis() {
        let config = WebifyConfig::default().resolve_with(|_| None).unwrap();
        assert_eq!(config.webify.key_prefix, "webify");
        assert_eq!(config.redis.url, DEFAULT_REDIS_URL);
    }

    #[test]
    fn expands_embedded_placeholders() {
        let expanded = expand_placeholders("redis://${REDIS_HOST}:6379/0", lookup).unwrap();
        assert_eq!(expanded, "redis://cache.internal:6379/0");
        assert_eq!(expand_placeholders("plain", lookup).unwrap(), "plain");
    }

    #[test]
    fn reports_missing_and_unterminated_placeholders() {
        let err = expand_placeholders("${NOPE}", lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { ref name } if name == "NOPE"));
        let err = expand_placeholders("redis://${REDIS_HOST", lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Unterminated { .. }));
    }

    #[test]
    fn other_missing_variables_are_errors() {
        let config = WebifyConfig {
            webify: WebifySettings {
                key_prefix: "${MISSING_PREFIX}".into(),
            },
            redis: RedisSettings::default(),
        };
        assert!(config.resolve_with(lookup).is_err());
    }

    #[test]
    fn resolves_placeholders_in_parsed_file() {
        let parsed: WebifyConfig =
            toml::from_str("[webify]\nkey_prefix = \"${TENANT}-webify\"\n[redis]\nurl = \"redis://${REDIS_HOST}\"").unwrap();
        let config = parsed.resolve_with(lookup).unwrap();
        assert_eq!(config.webify.key_prefix, "acme-webify");
        assert_eq!(config.redis.url, "redis://cache.internal");
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[webify]\nkey_prefix = \"blog\"\n\n[redis]\nurl = \"redis://localhost:6380\"").unwrap();
        let config = WebifyConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.webify.key_prefix, "blog");
        assert_eq!(config.redis.url, "redis://localhost:6380");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = WebifyConfig::from_toml_str("[redis]\nurl = \"redis://db:6379\"").unwrap();
        assert_eq!(config.webify.key_prefix, DEFAULT_KEY_PREFIX);
        assert_eq!(config.redis.url, "redis://db:6379");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WebifyConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = WebifyConfig::from_toml_str("[webify\nkey_prefix = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
