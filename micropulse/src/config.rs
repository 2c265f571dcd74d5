use anyhow::Context;
use std::env;

pub const DEFAULT_VERSION: &str = "0.0.1";
pub const DEFAULT_PORT: u16 = 4567;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Deployment environment, parsed from `APP_ENV`.
///
/// `Test` suppresses per-request logging; `Production` redacts internal
/// error text from 500 responses. Anything unrecognized is `Development`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Environment::Test)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub version: String,
    pub environment: Environment,
    pub cors_origin: String,
    pub port: u16,
    pub host: String,
}

impl Config {
    /// Resolve the full configuration from process environment variables.
    /// Called once at startup; handlers never read the environment directly.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            app_name: lookup("APP_NAME").unwrap_or_else(|| "micropulse".into()),
            version: lookup("APP_VERSION").unwrap_or_else(|| DEFAULT_VERSION.into()),
            environment: lookup("APP_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or_default(),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "*".into()),
            port,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn environment_default_is_development() {
        let e = Environment::default();
        match e {
            Environment::Development => {}
            _ => panic!("Environment default should be Development"),
        }
    }

    #[test]
    fn environment_parse_recognizes_known_values() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PRODUCTION"), Environment::Production);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse("staging"), Environment::Development);
        assert_eq!(Environment::parse(""), Environment::Development);
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let cfg = Config::from_lookup(|_| None).expect("config");
        assert_eq!(cfg.app_name, "micropulse");
        assert_eq!(cfg.version, DEFAULT_VERSION);
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.cors_origin, "*");
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(cfg.listen_addr(), "0.0.0.0:4567");
    }

    #[test]
    fn overrides_take_precedence_over_defaults() {
        let vars: HashMap<&str, &str> = [
            ("APP_NAME", "pulse-under-test"),
            ("APP_VERSION", "1.2.3"),
            ("APP_ENV", "production"),
            ("CORS_ORIGIN", "https://example.com"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
        ]
        .into_iter()
        .collect();

        let cfg = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("config");
        assert_eq!(cfg.app_name, "pulse-under-test");
        assert_eq!(cfg.version, "1.2.3");
        assert!(cfg.environment.is_production());
        assert_eq!(cfg.cors_origin, "https://example.com");
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = Config::from_lookup(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err(), "non-numeric PORT should fail");
        if let Err(e) = result {
            assert!(
                e.to_string().contains("Invalid PORT"),
                "error should name the PORT variable: {}",
                e
            );
        }
    }
}
