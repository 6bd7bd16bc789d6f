use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

fn parse_env_or<T: FromStr>(var: &str, default: T) -> T
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for the session side: where `/api/*` lives and how lookups behave.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub max_suggestions: usize,
    pub refresh_policy: RefreshPolicy,
}

/// Settings for the gateway that answers `/api/normalize` and `/api/interactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub rxnav_base_url: String,
    pub request_timeout_secs: u64,
    pub max_suggestions: usize,
    pub cache_size: usize,
}

/// How the interaction cache is rebuilt when the pair list changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Drop every entry and fetch all pairs again.
    #[default]
    Replace,
    /// Keep settled entries for pairs that are still selected, fetch the rest.
    Diff,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(RefreshPolicy::Replace),
            "diff" => Ok(RefreshPolicy::Diff),
            other => Err(format!("unknown refresh policy '{other}'")),
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshPolicy::Replace => write!(f, "replace"),
            RefreshPolicy::Diff => write!(f, "diff"),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 10,
            search_debounce_ms: 200,
            max_suggestions: 10,
            refresh_policy: RefreshPolicy::Replace,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rxnav_base_url: "https://rxnav.nlm.nih.gov".to_string(),
            request_timeout_secs: 10,
            max_suggestions: 10,
            cache_size: 512,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let client_defaults = ClientConfig::default();
        let gateway_defaults = GatewayConfig::default();
        let request_timeout_secs = parse_env_or(
            "RXMATRIX_REQUEST_TIMEOUT",
            client_defaults.request_timeout_secs,
        );
        let max_suggestions =
            parse_env_or("RXMATRIX_MAX_SUGGESTIONS", client_defaults.max_suggestions);

        Self {
            server: ServerConfig {
                host: env::var("RXMATRIX_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("RXMATRIX_PORT", 3000),
            },
            client: ClientConfig {
                api_base_url: env::var("RXMATRIX_API_BASE_URL")
                    .unwrap_or(client_defaults.api_base_url),
                request_timeout_secs,
                search_debounce_ms: parse_env_or(
                    "RXMATRIX_SEARCH_DEBOUNCE_MS",
                    client_defaults.search_debounce_ms,
                ),
                max_suggestions,
                refresh_policy: parse_env_or(
                    "RXMATRIX_REFRESH_POLICY",
                    client_defaults.refresh_policy,
                ),
            },
            gateway: GatewayConfig {
                rxnav_base_url: env::var("RXNAV_BASE_URL")
                    .unwrap_or(gateway_defaults.rxnav_base_url),
                request_timeout_secs,
                max_suggestions,
                cache_size: parse_env_or("GATEWAY_CACHE_SIZE", gateway_defaults.cache_size),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
