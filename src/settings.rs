//! Runtime settings from the environment (`.env` is loaded by the binary via dotenvy).

use crate::context::SYSTEM_LANGUAGE_ID;
use crate::error::ConfigError;
use std::net::SocketAddr;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub default_language_id: Uuid,
    pub default_sales_channel_id: Option<Uuid>,
    /// Upper bound for `limit` on store API listings.
    pub max_limit: u32,
    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr: SocketAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), Some(SocketAddr::from(([0, 0, 0, 0], 3000))))?;
        let max_connections: u32 = parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), Some(5))?;
        let default_language_id: Uuid =
            parse_or("DEFAULT_LANGUAGE_ID", get("DEFAULT_LANGUAGE_ID"), Some(SYSTEM_LANGUAGE_ID))?;
        let default_sales_channel_id = get("DEFAULT_SALES_CHANNEL_ID")
            .map(|v| parse_value::<Uuid>("DEFAULT_SALES_CHANNEL_ID", &v))
            .transpose()?;
        let max_limit: u32 = parse_or("STORE_API_MAX_LIMIT", get("STORE_API_MAX_LIMIT"), Some(100))?;
        if max_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "STORE_API_MAX_LIMIT",
                message: "must be positive".into(),
            });
        }
        let body_limit: usize = parse_or("STORE_API_BODY_LIMIT", get("STORE_API_BODY_LIMIT"), Some(64 * 1024))?;

        Ok(Settings {
            database_url,
            bind_addr,
            max_connections,
            default_language_id,
            default_sales_channel_id,
            max_limit,
            body_limit,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::from_lookup(|key| (key == "DATABASE_URL").then(|| "postgres://localhost/test".to_string()))
            .expect("test settings")
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => parse_value(key, &v),
        None => default.ok_or(ConfigError::Missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let s = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/blog")])).unwrap();
        assert_eq!(s.bind_addr.port(), 3000);
        assert_eq!(s.max_connections, 5);
        assert_eq!(s.default_language_id, SYSTEM_LANGUAGE_ID);
        assert_eq!(s.default_sales_channel_id, None);
        assert_eq!(s.max_limit, 100);
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(
            Settings::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn invalid_values_are_reported_with_key() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/blog"),
            ("DEFAULT_LANGUAGE_ID", "english"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DEFAULT_LANGUAGE_ID", .. }));

        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/blog"),
            ("STORE_API_MAX_LIMIT", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORE_API_MAX_LIMIT", .. }));
    }
}
