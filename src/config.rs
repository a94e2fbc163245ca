use serde::Deserialize;
use std::time::Duration;

/// Club queried when no identifier is given on the command line.
pub const DEFAULT_CLUB_ID: &str = "07620112";

/// Placeholder credential shipped in sample invocations; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_SMARTPING_API_KEY";

pub const DEFAULT_SMARTPING_BASE_URL: &str = "https://www.fftt.com/mobile/pxml/";
pub const DEFAULT_PINGPOCKET_BASE_URL: &str = "https://www.pingpocket.fr";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub smartping_base_url: String,
    pub pingpocket_base_url: String,
    pub smartping_timeout_secs: u64,
    pub pingpocket_timeout_secs: u64,
    pub smartping_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smartping_base_url: DEFAULT_SMARTPING_BASE_URL.to_string(),
            pingpocket_base_url: DEFAULT_PINGPOCKET_BASE_URL.to_string(),
            smartping_timeout_secs: 10,
            pingpocket_timeout_secs: 15,
            smartping_api_key: None,
        }
    }
}

impl Config {
    /// Loads `.env` then reads the process environment.
    ///
    /// Never fails: a malformed value is logged and replaced by its default,
    /// so the binary always reaches the point where it emits a result.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|name| std::env::var(name).ok());

        // Never log the credential itself
        tracing::debug!("SmartPing base URL: {}", config.smartping_base_url);
        tracing::debug!("PingPocket base URL: {}", config.pingpocket_base_url);
        tracing::debug!(
            "Timeouts: smartping={}s pingpocket={}s",
            config.smartping_timeout_secs,
            config.pingpocket_timeout_secs
        );
        tracing::debug!(
            "SmartPing key from environment: {}",
            config.smartping_api_key.is_some()
        );

        config
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            smartping_base_url: or_default(
                "SMARTPING_BASE_URL",
                http_url_var(&lookup, "SMARTPING_BASE_URL"),
                defaults.smartping_base_url,
            ),
            pingpocket_base_url: or_default(
                "PINGPOCKET_BASE_URL",
                http_url_var(&lookup, "PINGPOCKET_BASE_URL"),
                defaults.pingpocket_base_url,
            ),
            smartping_timeout_secs: or_default(
                "SMARTPING_TIMEOUT_SECS",
                secs_var(&lookup, "SMARTPING_TIMEOUT_SECS"),
                defaults.smartping_timeout_secs,
            ),
            pingpocket_timeout_secs: or_default(
                "PINGPOCKET_TIMEOUT_SECS",
                secs_var(&lookup, "PINGPOCKET_TIMEOUT_SECS"),
                defaults.pingpocket_timeout_secs,
            ),
            smartping_api_key: lookup("SMARTPING_API_KEY").and_then(|key| normalize_api_key(&key)),
        }
    }

    pub fn smartping_timeout(&self) -> Duration {
        Duration::from_secs(self.smartping_timeout_secs)
    }

    pub fn pingpocket_timeout(&self) -> Duration {
        Duration::from_secs(self.pingpocket_timeout_secs)
    }
}

fn or_default<T: std::fmt::Debug>(name: &str, value: anyhow::Result<Option<T>>, default: T) -> T {
    match value {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            tracing::error!("Ignoring {}: {}; using default {:?}", name, e, default);
            default
        }
    }
}

fn http_url_var<F>(lookup: &F, name: &str) -> anyhow::Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(url) if url.trim().is_empty() => Ok(None),
        Some(url) => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
            Ok(Some(url))
        }
        None => Ok(None),
    }
}

fn secs_var<F>(lookup: &F, name: &str) -> anyhow::Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("{} must be a positive number of seconds", name)),
        None => Ok(None),
    }
}

/// Maps an empty value or the sample placeholder to "no credential".
pub fn normalize_api_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        None
    } else {
        Some(key.to_string())
    }
}

/// Positional command-line arguments: `[club_id] [api_key]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub club_id: String,
    pub api_key: Option<String>,
    pub help: bool,
}

impl CliArgs {
    /// Parses arguments, program name excluded.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positional = Vec::new();
        let mut help = false;

        for arg in args.into_iter().map(Into::into) {
            match arg.as_str() {
                "-h" | "--help" => help = true,
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let club_id = positional
            .next()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLUB_ID.to_string());
        let api_key = positional.next().and_then(|key| normalize_api_key(&key));

        Self {
            club_id,
            api_key,
            help,
        }
    }
}

pub const USAGE: &str = "\
Usage: fftt-licensees [CLUB_ID] [SMARTPING_API_KEY]

Fetches the licensees of a club from the FFTT SmartPing API, falling back
to the PingPocket roster page, and prints one JSON result on stdout.

  CLUB_ID             8-digit FFTT club number (default 07620112)
  SMARTPING_API_KEY   SmartPing credential; falls back to $SMARTPING_API_KEY

Diagnostics go to stderr; tune them with RUST_LOG.";
