use thiserror::Error;

use crate::infrastructure::paypal::{PaypalConfig, LIVE_HOST, SANDBOX_HOST};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Deployment stage, read from `ENV`. Only decides the default PayPal host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Uat,
    Prod,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "dev" => Some(Environment::Dev),
            "uat" => Some(Environment::Uat),
            "prod" => Some(Environment::Prod),
            _ => None,
        }
    }

    fn default_paypal_host(&self) -> &'static str {
        match self {
            Environment::Prod => LIVE_HOST,
            Environment::Dev | Environment::Uat => SANDBOX_HOST,
        }
    }
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub env: Environment,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub paypal: PaypalConfig,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let env = match var("ENV") {
            Some(raw) => Environment::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "ENV",
                reason: format!("expected dev, uat or prod, got {}", raw),
            })?,
            None => Environment::Dev,
        };

        let ttl_hours = match var("JWT_TTL_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "JWT_TTL_HOURS",
                        reason: format!("expected a positive number of hours, got {}", raw),
                    })
                }
            },
            None => 24,
        };

        let paypal = PaypalConfig::new(required("PAYPAL_CLIENT_ID")?, required("PAYPAL_SECRET_ID")?)
            .with_host(var("PAYPAL_HOST").unwrap_or_else(|| env.default_paypal_host().to_string()));

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "ADMIN_USERNAME",
                    reason: "ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together"
                        .to_string(),
                })
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            env,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl: chrono::Duration::hours(ttl_hours),
            paypal,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://localhost/pisces"),
        ("JWT_SECRET", "secret"),
        ("PAYPAL_CLIENT_ID", "client"),
        ("PAYPAL_SECRET_ID", "paypal-secret"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).expect("config");

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.env, Environment::Dev);
        assert_eq!(config.jwt_ttl, chrono::Duration::hours(24));
        assert_eq!(config.paypal.host, SANDBOX_HOST);
        assert!(config.admin.is_none());
    }

    #[test]
    fn prod_defaults_to_live_paypal() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ENV", "prod"));

        let config = AppConfig::from_lookup(lookup(&vars)).expect("config");
        assert_eq!(config.paypal.host, LIVE_HOST);
    }

    #[test]
    fn missing_required_var_is_reported_by_name() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "JWT_SECRET")
            .collect();

        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (name, value) in [("PORT", "eighty"), ("ENV", "staging"), ("JWT_TTL_HOURS", "0")] {
            let mut vars = REQUIRED.to_vec();
            vars.push((name, value));

            let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: n, .. } if n == name),
                "{} = {} gave {:?}",
                name,
                value,
                err
            );
        }
    }

    #[test]
    fn admin_seed_needs_all_three_vars() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ADMIN_USERNAME", "root"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());

        vars.push(("ADMIN_EMAIL", "root@example.com"));
        vars.push(("ADMIN_PASSWORD", "changeme"));
        let config = AppConfig::from_lookup(lookup(&vars)).expect("config");
        assert_eq!(
            config.admin.map(|a| a.username),
            Some("root".to_string())
        );
    }
}
