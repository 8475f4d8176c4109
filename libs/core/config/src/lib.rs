//! Environment-driven configuration shared by the workspace binaries.

pub mod tracing;

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Deployment environment; selects the log format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Read `APP_ENV`; anything but "production" (any case) is development
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");
        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Value of `key`, or `default` when unset or empty
pub fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env_optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Value of `key`; unset and empty are both `None`
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse `key` into `T`, falling back to `default` when unset
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env_optional(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: format!("{}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert_eq!(Environment::from_env(), Environment::Production);
            });
        }
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("CORE_CONFIG_TEST_VAR", Some("test_value"), || {
            assert_eq!(env_or_default("CORE_CONFIG_TEST_VAR", "default"), "test_value");
        });
        temp_env::with_var_unset("CORE_CONFIG_TEST_VAR", || {
            assert_eq!(env_or_default("CORE_CONFIG_TEST_VAR", "default"), "default");
        });
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        temp_env::with_var("CORE_CONFIG_EMPTY", Some("  "), || {
            assert_eq!(env_optional("CORE_CONFIG_EMPTY"), None);
            assert_eq!(env_or_default("CORE_CONFIG_EMPTY", "fallback"), "fallback");
            assert!(env_required("CORE_CONFIG_EMPTY").is_err());
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("CORE_CONFIG_REQUIRED", || {
            let err = env_required("CORE_CONFIG_REQUIRED").unwrap_err();
            assert_eq!(err, ConfigError::MissingEnvVar("CORE_CONFIG_REQUIRED".to_string()));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_parse() {
        temp_env::with_var("CORE_CONFIG_SECS", Some(" 45 "), || {
            assert_eq!(env_parse("CORE_CONFIG_SECS", 30u64).unwrap(), 45);
        });
        temp_env::with_var_unset("CORE_CONFIG_SECS", || {
            assert_eq!(env_parse("CORE_CONFIG_SECS", 30u64).unwrap(), 30);
        });
    }

    #[test]
    fn test_env_parse_invalid() {
        temp_env::with_var("CORE_CONFIG_SECS", Some("soon"), || {
            match env_parse("CORE_CONFIG_SECS", 30u64) {
                Err(ConfigError::ParseError { key, .. }) => assert_eq!(key, "CORE_CONFIG_SECS"),
                other => panic!("expected ParseError, got {other:?}"),
            }
        });
    }
}
