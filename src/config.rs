use secrecy::SecretString;
use std::{net::IpAddr, time::Duration};

/// Default RAWG API root
pub const DEFAULT_RAWG_BASE_URL: &str = "https://api.rawg.io/api";

/// Default table holding user records
pub const DEFAULT_USERS_TABLE: &str = "Users";

/// Recommended minimum length for the session signing secret
const MIN_SECRET_LEN: usize = 32;

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        // Argon2id defaults, roughly 100ms per hash on server hardware
        Self {
            memory_kib: 19_456,
            iterations: 2,
        }
    }
}

/// Immutable process configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign session tokens
    pub session_secret: SecretString,
    /// RAWG API key
    pub rawg_key: SecretString,
    /// RAWG API root, without trailing slash
    pub rawg_base_url: String,
    /// Supabase project URL, without trailing slash
    pub supabase_url: String,
    /// Supabase service key
    pub supabase_key: SecretString,
    /// Table holding user records
    pub users_table: String,
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_allowed_origins: Vec<String>,
    /// Timeout applied to every outbound call
    pub outbound_timeout: Duration,
    /// Requests per minute per IP on `/login` and `/register`
    pub auth_rate_limit_per_minute: usize,
    /// Take the client IP from `X-Forwarded-For` (only behind a trusted proxy)
    pub trust_forwarded_for: bool,
    pub hash_cost: HashCost,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variables may come from the environment
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let session_secret = required("JWT_SECRET")?;
        if session_secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                "JWT_SECRET is shorter than {} bytes; use a longer random secret",
                MIN_SECRET_LEN
            );
        }

        let rawg_key = required("RAWG_KEY")?;
        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let supabase_key = required("SUPABASE_KEY")?;

        let rawg_base_url = get("RAWG_BASE_URL")
            .unwrap_or_else(|| DEFAULT_RAWG_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let users_table =
            get("SUPABASE_USERS_TABLE").unwrap_or_else(|| DEFAULT_USERS_TABLE.to_string());

        let bind_addr = parse_or(get("BIND_ADDR"), "BIND_ADDR", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(get("PORT"), "PORT", 3000u16)?;
        let cookie_secure = parse_bool(get("COOKIE_SECURE"), "COOKIE_SECURE")?;
        let outbound_timeout_secs =
            parse_or(get("OUTBOUND_TIMEOUT_SECS"), "OUTBOUND_TIMEOUT_SECS", 5u64)?;
        if outbound_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "OUTBOUND_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        let auth_rate_limit_per_minute =
            parse_or(get("AUTH_RATE_LIMIT_PER_MINUTE"), "AUTH_RATE_LIMIT_PER_MINUTE", 20usize)?;
        let trust_forwarded_for = parse_bool(get("TRUST_FORWARDED_FOR"), "TRUST_FORWARDED_FOR")?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(
                get("PASSWORD_HASH_MEMORY_KIB"),
                "PASSWORD_HASH_MEMORY_KIB",
                defaults.memory_kib,
            )?,
            iterations: parse_or(
                get("PASSWORD_HASH_ITERATIONS"),
                "PASSWORD_HASH_ITERATIONS",
                defaults.iterations,
            )?,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|list| {
                list.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_secret: SecretString::from(session_secret),
            rawg_key: SecretString::from(rawg_key),
            rawg_base_url,
            supabase_url,
            supabase_key: SecretString::from(supabase_key),
            users_table,
            bind_addr,
            port,
            cookie_secure,
            cors_allowed_origins,
            outbound_timeout: Duration::from_secs(outbound_timeout_secs),
            auth_rate_limit_per_minute,
            trust_forwarded_for,
            hash_cost,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(value: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("RAWG_KEY", "rawg-key"),
            ("SUPABASE_URL", "https://project.supabase.co/"),
            ("SUPABASE_KEY", "service-key"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_vars()).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.rawg_base_url, DEFAULT_RAWG_BASE_URL);
        assert_eq!(config.users_table, "Users");
        assert!(!config.cookie_secure);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.outbound_timeout, Duration::from_secs(5));
        assert_eq!(config.auth_rate_limit_per_minute, 20);
        assert!(!config.trust_forwarded_for);
        assert_eq!(config.hash_cost, HashCost::default());
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.supabase_url, "https://project.supabase.co");
    }

    #[test]
    fn test_secrets_loaded() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.rawg_key.expose_secret(), "rawg-key");
        assert_eq!(config.supabase_key.expose_secret(), "service-key");
    }

    #[test]
    fn test_secrets_not_in_debug_output() {
        let config = load(&base_vars()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("rawg-key"));
        assert!(!debug.contains("service-key"));
        assert!(!debug.contains("0123456789abcdef"));
    }

    #[test]
    fn test_missing_required_variable() {
        for key in ["JWT_SECRET", "RAWG_KEY", "SUPABASE_URL", "SUPABASE_KEY"] {
            let mut vars = base_vars();
            vars.remove(key);
            match load(&vars) {
                Err(ConfigError::Missing(missing)) => assert_eq!(missing, key),
                other => panic!("expected Missing({}), got {:?}", key, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_empty_value_is_missing() {
        let mut vars = base_vars();
        vars.insert("RAWG_KEY", "   ");
        assert!(matches!(load(&vars), Err(ConfigError::Missing("RAWG_KEY"))));
    }

    #[test]
    fn test_overrides() {
        let mut vars = base_vars();
        vars.insert("PORT", "8080");
        vars.insert("BIND_ADDR", "0.0.0.0");
        vars.insert("COOKIE_SECURE", "true");
        vars.insert("CORS_ALLOWED_ORIGINS", "http://localhost:5173, https://games.example.com,");
        vars.insert("OUTBOUND_TIMEOUT_SECS", "10");
        vars.insert("AUTH_RATE_LIMIT_PER_MINUTE", "5");
        vars.insert("TRUST_FORWARDED_FOR", "yes");
        vars.insert("PASSWORD_HASH_MEMORY_KIB", "8192");
        vars.insert("PASSWORD_HASH_ITERATIONS", "3");

        let config = load(&vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr, IpAddr::from([0, 0, 0, 0]));
        assert!(config.cookie_secure);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:5173", "https://games.example.com"]
        );
        assert_eq!(config.outbound_timeout, Duration::from_secs(10));
        assert_eq!(config.auth_rate_limit_per_minute, 5);
        assert!(config.trust_forwarded_for);
        assert_eq!(
            config.hash_cost,
            HashCost {
                memory_kib: 8192,
                iterations: 3
            }
        );
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = base_vars();
        vars.insert("PORT", "not-a-port");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }

    #[test]
    fn test_invalid_bool() {
        let mut vars = base_vars();
        vars.insert("COOKIE_SECURE", "maybe");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                key: "COOKIE_SECURE",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut vars = base_vars();
        vars.insert("OUTBOUND_TIMEOUT_SECS", "0");
        assert!(load(&vars).is_err());
    }
}
