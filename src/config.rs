use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{AuthSettings, YOUTUBE_SCOPE};
use crate::manager::{ManagerSettings, RetryPolicy};
use crate::models::PrivacyStatus;
use crate::DEFAULT_API_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "playlist-shuffler.toml";

/// The API caps `maxResults` at 50.
const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub client_secrets: PathBuf,
    pub token_cache: PathBuf,
    pub api_base_url: String,
    pub scopes: Vec<String>,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub insert_pacing_ms: u64,
    pub privacy_status: PrivacyStatus,
    pub open_browser: bool,
    pub redirect_port: u16,
    pub auth_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    client_secrets: Option<PathBuf>,
    token_cache: Option<PathBuf>,
    api_base_url: Option<String>,
    scopes: Option<Vec<String>>,
    page_size: Option<u32>,
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    insert_pacing_ms: Option<u64>,
    privacy_status: Option<PrivacyStatus>,
    open_browser: Option<bool>,
    redirect_port: Option<u16>,
    auth_timeout_secs: Option<u64>,
}

impl Config {
    /// Loads the config file, falling back to defaults when it is missing or invalid.
    pub fn init(path: &Path) -> Config {
        tracing::debug!("Loading config from file '{}'", path.display());
        let cfg = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at '{}'; using defaults", path.display());
                String::new()
            }
            Err(err) => {
                tracing::warn!("Failed to read config: {}; Falling back to defaults", err);
                String::new()
            }
        };
        let cfg = match Config::from_toml_str(&cfg) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Error while reading config: {}; Falling back to defaults", err);
                Config::default()
            }
        };
        tracing::info!("Using config: {}", cfg);
        cfg
    }

    pub fn from_toml_str(s: &str) -> Result<Config, toml::de::Error> {
        toml::from_str::<PartialConfig>(s).map(Config::from)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            client_secrets: self.client_secrets.clone(),
            token_cache: self.token_cache.clone(),
            scopes: self.scopes.clone(),
            open_browser: self.open_browser,
            redirect_port: self.redirect_port,
            timeout: Duration::from_secs(self.auth_timeout_secs),
        }
    }

    pub fn manager_settings(&self) -> ManagerSettings {
        ManagerSettings {
            page_size: self.page_size,
            privacy_status: self.privacy_status,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                retry_delay: Duration::from_millis(self.retry_delay_ms),
                insert_pacing: Duration::from_millis(self.insert_pacing_ms),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        PartialConfig::default().into()
    }
}

impl From<PartialConfig> for Config {
    fn from(cfg: PartialConfig) -> Config {
        Config {
            client_secrets: cfg.client_secrets.unwrap_or_else(|| "credentials.json".into()),
            token_cache: cfg.token_cache.unwrap_or_else(|| "token.json".into()),
            api_base_url: cfg.api_base_url.unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            scopes: cfg
                .scopes
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| vec![YOUTUBE_SCOPE.to_string()]),
            page_size: cfg.page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            max_retries: cfg.max_retries.unwrap_or(3).max(1),
            retry_delay_ms: cfg.retry_delay_ms.unwrap_or(1000),
            insert_pacing_ms: cfg.insert_pacing_ms.unwrap_or(100),
            privacy_status: cfg.privacy_status.unwrap_or_default(),
            open_browser: cfg.open_browser.unwrap_or(true),
            redirect_port: cfg.redirect_port.unwrap_or(0),
            auth_timeout_secs: cfg.auth_timeout_secs.unwrap_or(300),
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config {{")?;
        writeln!(f, "\tclient_secrets = '{}',", self.client_secrets.display())?;
        writeln!(f, "\ttoken_cache = '{}',", self.token_cache.display())?;
        writeln!(f, "\tapi_base_url = '{}',", self.api_base_url)?;
        writeln!(f, "\tscopes = {:?},", self.scopes)?;
        writeln!(f, "\tpage_size = {},", self.page_size)?;
        writeln!(f, "\tmax_retries = {},", self.max_retries)?;
        writeln!(f, "\tretry_delay_ms = {},", self.retry_delay_ms)?;
        writeln!(f, "\tinsert_pacing_ms = {},", self.insert_pacing_ms)?;
        writeln!(f, "\tprivacy_status = {},", self.privacy_status)?;
        writeln!(f, "\topen_browser = {},", self.open_browser)?;
        writeln!(f, "\tredirect_port = {},", self.redirect_port)?;
        writeln!(f, "\tauth_timeout_secs = {},", self.auth_timeout_secs)?;
        write!(f, "}}")
    }
}
