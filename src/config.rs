use std::env;
use std::time::Duration;

/// User agent sent with every portal request.
pub const USER_AGENT: &str = concat!("fiscalmon/", env!("CARGO_PKG_VERSION"));

/// The Department of Finance "Fiscal Monitor" package on open.canada.ca.
pub const FISCAL_MONITOR_DATASET: &str = "7680320b-c837-4b67-b73f-9361c4a9716d";

pub const DEFAULT_PORTAL: &str = "https://open.canada.ca/data";

/// Server-side settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the metric API binds to (`PORT`).
    pub port: u16,
    /// CKAN portal base URL (`FISCALMON_PORTAL`).
    pub portal: String,
    /// Dataset (package) identifier (`FISCALMON_DATASET`).
    pub dataset: String,
    /// Per-request upstream timeout (`FISCALMON_TIMEOUT_SECS`).
    pub request_timeout: Duration,
    /// How long extracted table text stays cached (`FISCALMON_CACHE_TTL_SECS`).
    pub cache_ttl: Duration,
    /// Upper bound on cached tables (`FISCALMON_CACHE_MAX`).
    pub cache_max_tables: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            portal: DEFAULT_PORTAL.to_string(),
            dataset: FISCAL_MONITOR_DATASET.to_string(),
            request_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            cache_max_tables: 8,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            port: env_parsed("PORT").unwrap_or(defaults.port),
            portal: env::var("FISCALMON_PORTAL").unwrap_or(defaults.portal),
            dataset: env::var("FISCALMON_DATASET").unwrap_or(defaults.dataset),
            request_timeout: env_parsed("FISCALMON_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            cache_ttl: env_parsed("FISCALMON_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_tables: env_parsed("FISCALMON_CACHE_MAX")
                .unwrap_or(defaults.cache_max_tables),
        }
    }

    /// CKAN `package_show` endpoint for the configured dataset.
    pub fn package_show_url(&self) -> String {
        format!(
            "{}/api/3/action/package_show?id={}",
            self.portal.trim_end_matches('/'),
            self.dataset
        )
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
