use std::str::FromStr;

use axum::http::HeaderValue;
use nahw_core::correction::DEFAULT_MAX_TEXT_LENGTH;
use nahw_engine::config::{parse_bool, ConfigError};

/// Server configuration loaded from environment variables.
///
/// Model settings live in [`nahw_engine::config::EngineConfig`]; this covers
/// the HTTP surface and request validation.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Upper bound on a submission, in characters.
    pub max_text_length: usize,
    /// Raises the default log level to `debug`.
    pub debug: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                 |
    /// |-------------------|-------------------------|
    /// | `HOST`            | `0.0.0.0`               |
    /// | `PORT`            | `8000`                  |
    /// | `CORS_ORIGINS`    | `http://localhost:8000` |
    /// | `MAX_TEXT_LENGTH` | `5000`                  |
    /// | `DEBUG`           | `false`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("PORT", "a valid u16", 8000u16)?;

        let raw_origins =
            std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:8000".into());
        let cors_origins = parse_origins(&raw_origins)?;

        let max_text_length = parse_var(
            "MAX_TEXT_LENGTH",
            "a positive integer",
            DEFAULT_MAX_TEXT_LENGTH,
        )?;
        if max_text_length == 0 {
            return Err(ConfigError {
                var: "MAX_TEXT_LENGTH",
                expected: "a positive integer",
                value: "0".to_string(),
            });
        }

        let debug = match std::env::var("DEBUG") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError {
                var: "DEBUG",
                expected: "a boolean",
                value,
            })?,
            Err(_) => false,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            max_text_length,
            debug,
        })
    }

    /// Tracing filter used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> String {
        let level = if self.debug { "debug" } else { "info" };
        format!("nahw_api={level},nahw_engine={level},nahw_db={level},tower_http={level}")
    }
}

fn parse_var<T: FromStr>(var: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError {
            var,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list, rejecting values that are not valid
/// header values.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| match HeaderValue::from_str(origin) {
            Ok(_) => Ok(origin.to_string()),
            Err(_) => Err(ConfigError {
                var: "CORS_ORIGINS",
                expected: "comma-separated origins",
                value: origin.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(debug: bool) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            debug,
        }
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins(" http://a.test , ,http://b.test").unwrap();
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn origin_with_control_character_is_rejected() {
        let err = parse_origins("http://a.test,bad\u{7f}origin").unwrap_err();
        assert_eq!(err.var, "CORS_ORIGINS");
    }

    #[test]
    fn log_filter_follows_debug_flag() {
        assert_eq!(
            config(false).log_filter(),
            "nahw_api=info,nahw_engine=info,nahw_db=info,tower_http=info"
        );
        assert!(config(true).log_filter().starts_with("nahw_api=debug"));
    }
}
