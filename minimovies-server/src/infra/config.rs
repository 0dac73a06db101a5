use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, anyhow};
use minimovies_core::player::TrustedOrigin;
use url::Url;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;

/// Settings for the embedded video player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Domain whose origins may drive the watch-progress tracker.
    pub trusted_domain: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            trusted_domain: TrustedOrigin::DEFAULT_DOMAIN.to_string(),
        }
    }
}

/// Lifetime of viewing sessions whose page went away without closing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewingSessionConfig {
    /// A session untouched for this long is evicted.
    pub idle_ttl: Duration,
    /// How often the sweeper looks for idle sessions.
    pub sweep_interval: Duration,
}

impl Default for ViewingSessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_SECS),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,

    pub database_url: Option<String>,
    pub db_max_connections: u32,

    /// Serve from the in-memory store with demo data instead of Postgres.
    pub ephemeral: bool,

    pub player: PlayerConfig,

    pub viewing_sessions: ViewingSessionConfig,

    pub cors_allowed_origins: Vec<String>,

    /// Origin of the page hosting the player; passed to the embed URL.
    pub public_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            ephemeral: false,
            player: PlayerConfig::default(),
            viewing_sessions: ViewingSessionConfig::default(),
            cors_allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            public_origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults;
    /// set-but-invalid values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let public_origin =
            get("PUBLIC_ORIGIN").unwrap_or(defaults.public_origin);
        Url::parse(&public_origin)
            .with_context(|| format!("PUBLIC_ORIGIN {public_origin:?} is not a URL"))?;

        let cors_allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_allowed_origins,
        };

        let viewing_sessions = ViewingSessionConfig {
            idle_ttl: positive_secs(
                &get,
                "VIEWING_SESSION_IDLE_SECS",
                defaults.viewing_sessions.idle_ttl,
            )?,
            sweep_interval: positive_secs(
                &get,
                "VIEWING_SESSION_SWEEP_SECS",
                defaults.viewing_sessions.sweep_interval,
            )?,
        };

        Ok(Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(&get, "SERVER_PORT", defaults.server_port)?,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or(
                &get,
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            ephemeral: match get("MINIMOVIES_EPHEMERAL") {
                Some(raw) => parse_flag("MINIMOVIES_EPHEMERAL", &raw)?,
                None => defaults.ephemeral,
            },
            player: PlayerConfig {
                trusted_domain: get("PLAYER_TRUSTED_DOMAIN")
                    .unwrap_or(defaults.player.trusted_domain),
            },
            viewing_sessions,
            cors_allowed_origins,
            public_origin,
        })
    }

    pub fn trusted_origin(&self) -> TrustedOrigin {
        TrustedOrigin::new(self.player.trusted_domain.as_str())
    }

    /// The database URL, required unless running ephemeral.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set unless MINIMOVIES_EPHEMERAL is enabled"))
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has invalid value {raw:?}")),
        None => Ok(default),
    }
}

fn positive_secs<G>(get: &G, key: &str, default: Duration) -> anyhow::Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(get, key, default.as_secs())?;
    if secs == 0 {
        return Err(anyhow!("{key} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{key} has invalid value {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.db_max_connections, 10);
        assert!(!config.ephemeral);
        assert_eq!(config.player.trusted_domain, "youtube.com");
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.viewing_sessions.idle_ttl, Duration::from_secs(1800));
        assert_eq!(config.viewing_sessions.sweep_interval, Duration::from_secs(60));
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/minimovies"),
            ("MINIMOVIES_EPHEMERAL", "yes"),
            ("PLAYER_TRUSTED_DOMAIN", "youtube-nocookie.com"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("VIEWING_SESSION_IDLE_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.server_port, 8080);
        assert!(config.ephemeral);
        assert_eq!(
            config.require_database_url().unwrap(),
            "postgres://localhost/minimovies"
        );
        assert!(
            config
                .trusted_origin()
                .matches("https://www.youtube-nocookie.com")
        );
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.viewing_sessions.idle_ttl, Duration::from_secs(600));
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = config_from(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));

        assert!(config_from(&[("DB_MAX_CONNECTIONS", "-1")]).is_err());
        assert!(config_from(&[("MINIMOVIES_EPHEMERAL", "maybe")]).is_err());
        assert!(config_from(&[("PUBLIC_ORIGIN", "not a url")]).is_err());
        assert!(config_from(&[("VIEWING_SESSION_SWEEP_SECS", "0")]).is_err());
        assert!(config_from(&[("VIEWING_SESSION_IDLE_SECS", "soon")]).is_err());
    }
}
