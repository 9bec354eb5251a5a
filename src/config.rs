use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::rate_limit::DEFAULT_MAX_PER_SECOND;

pub const BASE_URL: &str = "https://api.fiken.no/api/v2";
pub const TOKEN_URL: &str = "https://fiken.no/oauth/token";
pub const AUTHORIZE_URL: &str = "https://fiken.no/oauth/authorize";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base every resource path is appended to. No trailing slash.
    pub base_url: String,
    pub token_url: Url,
    pub authorize_url: Url,
    pub user_agent: String,
    /// Requests per second for the process-wide limiter; `None` disables limiting.
    pub rate_limit: Option<u32>,
    /// Applied to every request by the HTTP transport.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            token_url: parse_url(TOKEN_URL).expect("default token url is valid"),
            authorize_url: parse_url(AUTHORIZE_URL).expect("default authorize url is valid"),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit: Some(DEFAULT_MAX_PER_SECOND),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// The default configuration with overrides from `FIKEN_API_BASE`, `FIKEN_TOKEN_URL`
    /// and `FIKEN_RATE_LIMIT` (requests per second, `0` disables limiting).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("FIKEN_API_BASE") {
            config = config.with_base_url(&base)?;
        }
        if let Ok(token_url) = std::env::var("FIKEN_TOKEN_URL") {
            config.token_url = parse_url(&token_url)?;
        }
        if let Ok(limit) = std::env::var("FIKEN_RATE_LIMIT") {
            let limit: u32 = limit
                .trim()
                .parse()
                .map_err(|_| Error::InvalidEndpoint(format!("FIKEN_RATE_LIMIT={limit}")))?;
            config.rate_limit = (limit > 0).then_some(limit);
        }

        debug!(base_url = %config.base_url, rate_limit = ?config.rate_limit, "loaded config from environment");
        Ok(config)
    }

    /// Points the client at another API root, e.g. a mock server in tests.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        parse_url(base_url)?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_token_url(mut self, token_url: &str) -> Result<Self> {
        self.token_url = parse_url(token_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_rate_limit(mut self, max_per_second: Option<u32>) -> Self {
        self.rate_limit = max_per_second;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins a resolved resource path onto the base URL.
    pub(crate) fn url_for(&self, path: &str) -> Result<Url> {
        parse_url(&format!("{}{path}", self.base_url))
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|_| Error::InvalidEndpoint(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_fiken() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://api.fiken.no/api/v2");
        assert_eq!(config.token_url.as_str(), "https://fiken.no/oauth/token");
        assert_eq!(config.rate_limit, Some(4));
        assert!(config.user_agent.starts_with("fiken-rs/"));
    }

    #[test]
    fn paths_are_appended_to_the_base() {
        let config = Config::default()
            .with_base_url("http://127.0.0.1:9000/api/v2/")
            .unwrap();
        assert_eq!(
            config.url_for("/companies/demo/sales").unwrap().as_str(),
            "http://127.0.0.1:9000/api/v2/companies/demo/sales"
        );
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(matches!(
            Config::default().with_base_url("not a url"),
            Err(Error::InvalidEndpoint(_))
        ));
    }
}
