use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type Shared = Arc<Config>;

/// Placeholder replaced by the bot's user ID in [`StatsConfig::endpoint`].
pub const BOT_ID_PLACEHOLDER: &str = "{id}";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    #[serde(default)]
    pub command_prefix: Option<String>,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub stats: Option<StatsConfig>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Udp,
    Tcp,
    Tls,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_addr")]
    pub addr: SocketAddr,
    #[serde(default = "default_transport")]
    pub transport: Transport,
    #[serde(default = "default_tls_name")]
    pub tls_name: Option<String>,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_query_timeout")]
    pub timeout: Duration,
    /// Link put on answered replies, pointing at the upstream's public page. `null` omits it.
    #[serde(default = "default_info_url")]
    pub url: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct StatsConfig {
    pub token: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_stats_interval")]
    pub interval: Duration,
    #[serde(default = "default_stats_endpoint")]
    pub endpoint: String,
}

fn default_upstream_addr() -> SocketAddr {
    SocketAddr::from(([1, 1, 1, 1], 853))
}

fn default_transport() -> Transport {
    Transport::Tls
}

#[allow(clippy::unnecessary_wraps)]
fn default_tls_name() -> Option<String> {
    Some("cloudflare-dns.com".to_string())
}

#[allow(clippy::unnecessary_wraps)]
fn default_info_url() -> Option<String> {
    Some("https://1.1.1.1/".to_string())
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_stats_interval() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_stats_endpoint() -> String {
    format!("https://top.gg/api/bots/{BOT_ID_PLACEHOLDER}/stats")
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            addr: default_upstream_addr(),
            transport: default_transport(),
            tls_name: default_tls_name(),
            timeout: default_query_timeout(),
            url: default_info_url(),
        }
    }
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn try_from_str(s: &str) -> Result<Self, Error> {
        let conf: Config = serde_json::from_str(s)?;
        conf.validate()?;
        Ok(conf)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.discord_token.trim().is_empty() {
            return Err(Error::InvalidConfig("discord_token must not be empty".into()));
        }
        if let Some(prefix) = &self.command_prefix {
            if prefix.is_empty() || prefix.contains(char::is_whitespace) {
                return Err(Error::InvalidConfig(format!(
                    "command_prefix {prefix:?} must be a single non-empty word"
                )));
            }
        }
        self.upstream.validate()?;
        if let Some(stats) = &self.stats {
            stats.validate()?;
        }
        Ok(())
    }
}

impl UpstreamConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("upstream timeout must not be zero".into()));
        }
        match (self.transport, self.tls_name.as_deref()) {
            (Transport::Tls, None | Some("")) => Err(Error::InvalidConfig(
                "upstream tls_name is required for the tls transport".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl StatsConfig {
    fn validate(&self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::InvalidConfig("stats token must not be empty".into()));
        }
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig("stats interval must not be zero".into()));
        }
        if !self.endpoint.contains(BOT_ID_PLACEHOLDER) {
            return Err(Error::InvalidConfig(format!(
                "stats endpoint must contain {BOT_ID_PLACEHOLDER}"
            )));
        }
        Ok(())
    }

    /// The endpoint URL for the bot with the given user ID.
    pub fn endpoint_for(&self, bot_id: u64) -> String {
        self.endpoint
            .replace(BOT_ID_PLACEHOLDER, &bot_id.to_string())
    }
}
