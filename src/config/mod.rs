use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Minimum bcrypt work factor. Configuration may raise it, never lower it.
pub const MIN_BCRYPT_COST: u32 = 12;

/// Longest token lifetime the server accepts.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("BCRYPT_COST must be at least 12, got {0}")]
    WeakBcryptCost(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` or `memory://`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// Prefix every route is nested under. Empty or "/" mounts at the root.
    pub base_path: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    #[serde(with = "duration_secs")]
    pub jwt_expiry: Duration,
    pub bcrypt_cost: u32,
    /// First entry doubles as the fallback origin for unknown callers.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let base = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        base.with_overrides(|name| env::var(name).ok())?.validated()
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Required values have no preset
        if let Some(v) = var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = v;
        }

        if let Some(v) = var("JWT_EXPIRES_IN") {
            self.security.jwt_expiry = parse_lifetime(&v).ok_or(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                value: v,
            })?;
        }
        if let Some(v) = var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().map_err(|_| ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: v,
            })?;
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().map_err(|_| ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: v,
            })?;
        }

        if let Some(v) = var("API_PORT").or_else(|| var("PORT")) {
            self.api.port = v.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
            })?;
        }
        if let Some(v) = var("API_BASE_PATH") {
            self.api.base_path = v;
        }
        if let Some(v) = var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().map_err(|_| ConfigError::Invalid {
                name: "API_MAX_PAGE_SIZE",
                value: v,
            })?;
        }

        Ok(self)
    }

    /// Rejects configurations the server must not start with.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        match url::Url::parse(&self.database.url) {
            Ok(u) if matches!(u.scheme(), "postgres" | "postgresql" | "memory") => {}
            _ => {
                return Err(ConfigError::Invalid {
                    name: "DATABASE_URL",
                    value: self.database.url.clone(),
                })
            }
        }
        if self.security.jwt_expiry.is_zero() || self.security.jwt_expiry > MAX_TOKEN_LIFETIME {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                value: format!("{}s", self.security.jwt_expiry.as_secs()),
            });
        }
        if self.security.bcrypt_cost < MIN_BCRYPT_COST {
            return Err(ConfigError::WeakBcryptCost(self.security.bcrypt_cost));
        }
        if self.security.cors_origins.is_empty() {
            return Err(ConfigError::Missing("SECURITY_CORS_ORIGINS"));
        }
        if self.api.default_page_size == 0 || self.api.max_page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "API_MAX_PAGE_SIZE",
                value: self.api.max_page_size.to_string(),
            });
        }
        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
            },
            api: ApiConfig {
                port: 5000,
                base_path: "/api".to_string(),
                default_page_size: 20,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry: Duration::from_secs(7 * 24 * 60 * 60),
                bcrypt_cost: MIN_BCRYPT_COST,
                cors_origins: default_cors_origins(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config
    }

    /// Development defaults with the given secret and store, for tests and tooling.
    pub fn for_store(jwt_secret: impl Into<String>, database_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = jwt_secret.into();
        config.database.url = database_url.into();
        config
    }
}

fn default_cors_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:5173",
        "https://student-panel-frontend-eight.vercel.app",
        "https://student-panel-frontend-q1q9sldt4-noel-manojs-projects.vercel.app",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Parses token lifetimes written as `7d`, `12h`, `30m`, `45s` or plain seconds.
pub fn parse_lifetime(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let (digits, unit) = match input.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&input[..idx], Some(c)),
        _ => (input, None),
    };

    let amount: u64 = digits.trim().parse().ok()?;
    let multiplier = match unit {
        None | Some('s') => 1,
        Some('m') => 60,
        Some('h') => 60 * 60,
        Some('d') => 24 * 60 * 60,
        Some('w') => 7 * 24 * 60 * 60,
        Some(_) => return None,
    };

    let secs = amount.checked_mul(multiplier)?;
    if secs == 0 || secs > MAX_TOKEN_LIFETIME.as_secs() {
        return None;
    }
    Some(Duration::from_secs(secs))
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.jwt_expiry, Duration::from_secs(604_800));
        assert_eq!(config.security.bcrypt_cost, 12);
        assert_eq!(config.api.base_path, "/api");
        assert_eq!(config.security.cors_origins[0], "http://localhost:3000");
    }

    #[test]
    fn missing_secret_is_rejected() {
        let config = AppConfig::for_store("", "memory://");
        assert!(matches!(config.validated(), Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let config = AppConfig::for_store("secret", "");
        assert!(matches!(config.validated(), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn unsupported_database_scheme_is_rejected() {
        let config = AppConfig::for_store("secret", "mysql://localhost/db");
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Invalid { name: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn bcrypt_cost_cannot_be_lowered() {
        let mut config = AppConfig::for_store("secret", "memory://");
        config.security.bcrypt_cost = 10;
        assert!(matches!(config.validated(), Err(ConfigError::WeakBcryptCost(10))));

        let mut config = AppConfig::for_store("secret", "memory://");
        config.security.bcrypt_cost = 13;
        assert!(config.validated().is_ok());
    }

    #[test]
    fn parses_lifetimes() {
        assert_eq!(parse_lifetime("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_lifetime("12h"), Some(Duration::from_secs(43_200)));
        assert_eq!(parse_lifetime("30m"), Some(Duration::from_secs(1_800)));
        assert_eq!(parse_lifetime("45s"), Some(Duration::from_secs(45)));
        assert_eq!(parse_lifetime("3600"), Some(Duration::from_secs(3_600)));
        assert_eq!(parse_lifetime("0"), None);
        assert_eq!(parse_lifetime("7y"), None);
        assert_eq!(parse_lifetime("d"), None);
        assert_eq!(parse_lifetime(""), None);
    }

    #[test]
    fn lifetimes_beyond_a_year_are_rejected() {
        assert_eq!(parse_lifetime("365d"), Some(MAX_TOKEN_LIFETIME));
        assert_eq!(parse_lifetime("366d"), None);
        assert_eq!(parse_lifetime("9223372036854775807"), None);
        assert_eq!(parse_lifetime("10000000000000000000"), None);

        let mut config = AppConfig::for_store("secret", "memory://");
        config.security.jwt_expiry = Duration::from_secs(u64::MAX);
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Invalid { name: "JWT_EXPIRES_IN", .. })
        ));
    }

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config = AppConfig::development()
            .with_overrides(overrides(&[
                ("JWT_SECRET", "s"),
                ("DATABASE_URL", "memory://"),
                ("DATABASE_MAX_CONNECTIONS", "4"),
                ("API_MAX_PAGE_SIZE", "50"),
                ("PORT", "8080"),
                ("JWT_EXPIRES_IN", "12h"),
            ]))
            .unwrap()
            .validated()
            .unwrap();
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.api.max_page_size, 50);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.security.jwt_expiry, Duration::from_secs(43_200));
    }

    #[test]
    fn unparsable_numbers_are_errors() {
        for name in ["DATABASE_MAX_CONNECTIONS", "API_MAX_PAGE_SIZE", "PORT", "BCRYPT_COST"] {
            let result = AppConfig::development().with_overrides(overrides(&[(name, "lots")]));
            assert!(
                matches!(&result, Err(ConfigError::Invalid { value, .. }) if value == "lots"),
                "{} accepted a non-number",
                name
            );
        }
        let result = AppConfig::development().with_overrides(overrides(&[("JWT_EXPIRES_IN", "400d")]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "JWT_EXPIRES_IN", .. })));
    }
}
