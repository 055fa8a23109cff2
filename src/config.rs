use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEV_BASE_URL: &str = "https://api-dev.deltadefi.io";
pub const STAGING_BASE_URL: &str = "https://api-staging.deltadefi.io";
// No production host is published yet; mainnet points at staging.
pub const MAINNET_BASE_URL: &str = "https://api-staging.deltadefi.io";

/// Build/submit against the venue is slow; keep the transport timeout in minutes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiNetwork {
    #[default]
    Dev,
    Staging,
    Mainnet,
}

impl ApiNetwork {
    pub fn network_id(&self) -> u8 {
        match self {
            ApiNetwork::Mainnet => 1,
            ApiNetwork::Dev | ApiNetwork::Staging => 0,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ApiNetwork::Dev => DEV_BASE_URL,
            ApiNetwork::Staging => STAGING_BASE_URL,
            ApiNetwork::Mainnet => MAINNET_BASE_URL,
        }
    }
}

impl FromStr for ApiNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(ApiNetwork::Dev),
            "staging" => Ok(ApiNetwork::Staging),
            "mainnet" => Ok(ApiNetwork::Mainnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

impl fmt::Display for ApiNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiNetwork::Dev => "dev",
            ApiNetwork::Staging => "staging",
            ApiNetwork::Mainnet => "mainnet",
        };
        f.write_str(name)
    }
}

/// Connection settings for one client instance.
///
/// Built once and handed to [`crate::venue_module::VenueHttpClient::new`];
/// nothing here is global. The operation passcode is intentionally not part
/// of it.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub network: ApiNetwork,
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub base_url: Option<String>,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("network", &self.network)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ApiConfig {
    pub fn new(network: ApiNetwork, api_key: impl Into<String>) -> Self {
        Self {
            network,
            api_key: api_key.into(),
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read `DELTADEFI_NETWORK`, `DELTADEFI_API_KEY`, `DELTADEFI_BASE_URL` and
    /// `DELTADEFI_TIMEOUT_SECS`. Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let network = std::env::var("DELTADEFI_NETWORK")
            .ok()
            .and_then(|n| n.parse().ok())
            .unwrap_or_default();
        let request_timeout = std::env::var("DELTADEFI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        Self {
            network,
            api_key: std::env::var("DELTADEFI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("DELTADEFI_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            request_timeout,
        }
    }

    /// Provided base URL if any, else the network default. Never ends with `/`.
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(self.network.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn network_id(&self) -> u8 {
        self.network.network_id()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Switch network. An explicit base URL, if set, still takes precedence.
    pub fn with_network(mut self, network: ApiNetwork) -> Self {
        self.network = network;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
