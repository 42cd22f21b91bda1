//! Environment-driven configuration.
//!
//! Parsed once at startup; a missing or malformed required variable is a
//! fatal error before the server binds. Empty strings count as unset.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime environment, from `NODE_ENV`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl AppEnv {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::Invalid {
                name: "NODE_ENV",
                reason: format!("expected development, production or test, got {other:?}"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Whether the request gate enforces or only observes, from `ARCJET_ENV`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GateEnv {
    #[default]
    Development,
    Production,
}

impl GateEnv {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::Invalid {
                name: "ARCJET_ENV",
                reason: format!("expected development or production, got {other:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub app_port: u16,
    pub app_name: String,
    pub app_url: String,
    pub env: AppEnv,
    pub trigger_secret_key: Option<String>,
    pub trigger_project_id: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_mail: Option<String>,
    pub arcjet_key: Option<String>,
    pub arcjet_env: GateEnv,
    pub allowed_origins: Option<Vec<String>>,
    port_override: Option<u16>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse from an arbitrary lookup. `from_env` goes through here; tests
    /// pass a map instead of touching process globals.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(name)),
            }
        };
        let optional = |name: &'static str| -> Option<String> {
            lookup(name).filter(|value| !value.trim().is_empty())
        };

        let app_port_raw = required("APP_PORT")?;
        let app_port = app_port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid {
                name: "APP_PORT",
                reason: format!("not a port number: {app_port_raw:?}"),
            })?;

        let app_url = required("APP_URL")?;
        if !app_url.starts_with("http://") && !app_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "APP_URL",
                reason: format!("not an http(s) url: {app_url:?}"),
            });
        }

        let env = match optional("NODE_ENV") {
            Some(raw) => AppEnv::parse(&raw)?,
            None => AppEnv::Development,
        };
        let arcjet_env = match optional("ARCJET_ENV") {
            Some(raw) => GateEnv::parse(&raw)?,
            None => GateEnv::Development,
        };

        let allowed_origins = optional("ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        });

        // Hosting platforms inject PORT; it wins outside development.
        let port_override = optional("PORT").and_then(|raw| match raw.parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring unparseable PORT override");
                None
            }
        });

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            app_port,
            app_name: required("APP_NAME")?,
            app_url,
            env,
            trigger_secret_key: optional("TRIGGER_SECRET_KEY"),
            trigger_project_id: optional("TRIGGER_PROJECT_ID"),
            resend_api_key: optional("RESEND_API_KEY"),
            resend_mail: optional("RESEND_MAIL"),
            arcjet_key: optional("ARCJET_KEY"),
            arcjet_env,
            allowed_origins,
            port_override,
        })
    }

    /// The port the server binds: `APP_PORT` in development, the platform's
    /// `PORT` override (when present) everywhere else.
    pub fn listen_port(&self) -> u16 {
        if self.env.is_development() {
            self.app_port
        } else {
            self.port_override.unwrap_or(self.app_port)
        }
    }

    /// Bare config for wiring up test servers; all optional services off.
    pub fn for_tests(app_name: &str) -> Self {
        Self {
            database_url: "postgres://unused".to_string(),
            app_port: 0,
            app_name: app_name.to_string(),
            app_url: "http://localhost".to_string(),
            env: AppEnv::Test,
            trigger_secret_key: None,
            trigger_project_id: None,
            resend_api_key: None,
            resend_mail: None,
            arcjet_key: None,
            arcjet_env: GateEnv::Development,
            allowed_origins: None,
            port_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/forgekit"),
            ("APP_PORT", "3000"),
            ("APP_NAME", "Forgekit"),
            ("APP_URL", "http://localhost"),
        ])
    }

    fn parse(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn parses_the_minimal_environment() {
        let config = parse(&base_env()).unwrap();
        assert_eq!(config.app_port, 3000);
        assert_eq!(config.env, AppEnv::Development);
        assert_eq!(config.trigger_secret_key, None);
        assert_eq!(config.allowed_origins, None);
    }

    #[test]
    fn missing_required_variable_fails() {
        let mut env = base_env();
        env.remove("DATABASE_URL");
        assert!(matches!(
            parse(&env),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn empty_string_counts_as_unset() {
        let mut env = base_env();
        env.insert("APP_NAME", "   ");
        assert!(matches!(parse(&env), Err(ConfigError::Missing("APP_NAME"))));

        let mut env = base_env();
        env.insert("TRIGGER_SECRET_KEY", "");
        assert_eq!(parse(&env).unwrap().trigger_secret_key, None);
    }

    #[test]
    fn malformed_port_fails() {
        let mut env = base_env();
        env.insert("APP_PORT", "three-thousand");
        assert!(matches!(
            parse(&env),
            Err(ConfigError::Invalid { name: "APP_PORT", .. })
        ));
    }

    #[test]
    fn unknown_node_env_fails() {
        let mut env = base_env();
        env.insert("NODE_ENV", "staging");
        assert!(matches!(
            parse(&env),
            Err(ConfigError::Invalid { name: "NODE_ENV", .. })
        ));
    }

    #[test]
    fn non_http_app_url_fails() {
        let mut env = base_env();
        env.insert("APP_URL", "localhost:3000");
        assert!(matches!(
            parse(&env),
            Err(ConfigError::Invalid { name: "APP_URL", .. })
        ));
    }

    #[test]
    fn allowed_origins_split_on_commas() {
        let mut env = base_env();
        env.insert(
            "ALLOWED_ORIGINS",
            "https://app.example.com, https://admin.example.com ,",
        );
        let config = parse(&env).unwrap();
        assert_eq!(
            config.allowed_origins,
            Some(vec![
                "https://app.example.com".to_string(),
                "https://admin.example.com".to_string(),
            ])
        );
    }

    #[test]
    fn development_ignores_the_port_override() {
        let mut env = base_env();
        env.insert("PORT", "8080");
        let config = parse(&env).unwrap();
        assert_eq!(config.listen_port(), 3000);
    }

    #[test]
    fn production_prefers_the_port_override() {
        let mut env = base_env();
        env.insert("NODE_ENV", "production");
        env.insert("PORT", "8080");
        assert_eq!(parse(&env).unwrap().listen_port(), 8080);

        let mut env = base_env();
        env.insert("NODE_ENV", "production");
        assert_eq!(parse(&env).unwrap().listen_port(), 3000);

        let mut env = base_env();
        env.insert("NODE_ENV", "production");
        env.insert("PORT", "not-a-port");
        assert_eq!(parse(&env).unwrap().listen_port(), 3000);
    }
}
