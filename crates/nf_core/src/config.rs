use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use serde_json::{Map, Value};
use url::Url;

use crate::{Error, FeedQuery, Result};

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://openai.com/blog/rss.xml",
    "https://www.artificialintelligence-news.com/feed/rss/",
    "https://venturebeat.com/category/ai/feed/",
    "https://ainowinstitute.org/category/news/feed",
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Agentic Layer News Fetcher)";

/// Environment variable holding the sub-agent map.
pub const SUB_AGENTS_ENV: &str = "SUB_AGENTS";

fn default_feeds() -> Vec<String> {
    DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
}

/// Duration parsed from strings like `90d`, `1h30m` or a bare number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;
        // Whitespace seen after the pending number; only a unit may follow it
        let mut gap = false;

        for c in s.chars() {
            if c.is_whitespace() {
                gap = !current_number.is_empty();
            } else if c.is_ascii_digit() {
                if gap {
                    return Err(format!("Missing unit after {}", current_number));
                }
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration too large".to_string())?;
                current_number.clear();
                has_unit = true;
                gap = false;
            } else {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing number without a unit counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| "Duration too large".to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        if secs > 0 && secs % 86400 == 0 {
            write!(f, "{}d", secs / 86400)
        } else if secs > 0 && secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

/// Feed list, limits and outbound HTTP settings shared by every tool.
#[derive(Args, Debug, Clone)]
pub struct FetcherConfig {
    /// Feed URLs to aggregate (repeat the flag or separate with commas)
    #[arg(long = "feed", env = "NEWS_FEEDS", value_delimiter = ',', default_values_t = default_feeds())]
    pub feeds: Vec<String>,

    /// Maximum number of articles accepted from a single feed
    #[arg(long = "max-articles", env = "NEWS_MAX_ARTICLES", default_value_t = 10)]
    pub max_articles_per_feed: usize,

    /// How far back articles are accepted (e.g. 90d, 12h)
    #[arg(long, env = "NEWS_RECENCY", default_value = "90d")]
    pub recency: HumanDuration,

    /// Number of articles included in a listing
    #[arg(long, env = "NEWS_LISTING_LIMIT", default_value_t = 50)]
    pub listing_limit: usize,

    /// Timeout for every outbound request
    #[arg(long, env = "NEWS_HTTP_TIMEOUT", default_value = "10s")]
    pub timeout: HumanDuration,

    /// User-Agent sent with every outbound request
    #[arg(long, env = "NEWS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            max_articles_per_feed: 10,
            recency: HumanDuration(Duration::from_secs(90 * 86400)),
            listing_limit: 50,
            timeout: HumanDuration(Duration::from_secs(10)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn with_feeds<I, S>(mut self, feeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feeds = feeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn recency_window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.recency.0).unwrap_or(chrono::Duration::MAX)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout.0
    }

    pub fn query_for(&self, feed_url: &str) -> FeedQuery {
        FeedQuery::new(feed_url, self.max_articles_per_feed, self.recency_window())
    }

    /// Rejects an empty feed list and feed entries that are not http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            return Err(Error::Config("No feeds configured".to_string()));
        }
        for feed in &self.feeds {
            parse_http_url(feed).map_err(|e| Error::Config(format!("Feed '{}': {}", feed, e)))?;
        }
        Ok(())
    }
}

/// A named remote agent the news agent can delegate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAgentEndpoint {
    pub name: String,
    pub url: Url,
}

impl SubAgentEndpoint {
    /// Parses a JSON object of the form `{"summarizer": {"url": "http://..."}}`.
    ///
    /// Every entry must carry an http(s) `url`; the first malformed entry fails
    /// the whole configuration.
    pub fn parse_list(raw: &str) -> Result<Vec<SubAgentEndpoint>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let map: Map<String, Value> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("{} is not a JSON object: {}", SUB_AGENTS_ENV, e)))?;

        map.into_iter()
            .map(|(name, entry)| Self::from_entry(name, entry))
            .collect()
    }

    /// Reads `SUB_AGENTS`; an unset variable means no sub-agents.
    pub fn from_env() -> Result<Vec<SubAgentEndpoint>> {
        match std::env::var(SUB_AGENTS_ENV) {
            Ok(raw) => Self::parse_list(&raw),
            Err(std::env::VarError::NotPresent) => Ok(Vec::new()),
            Err(e) => Err(Error::Config(format!("{}: {}", SUB_AGENTS_ENV, e))),
        }
    }

    fn from_entry(name: String, entry: Value) -> Result<SubAgentEndpoint> {
        if name.trim().is_empty() {
            return Err(Error::Config("Sub-agent with empty name".to_string()));
        }

        let url = entry
            .as_object()
            .ok_or_else(|| Error::Config(format!("Sub-agent '{}' must be an object with a 'url'", name)))?
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Config(format!("Sub-agent '{}' is missing 'url'", name)))?;

        let url = parse_http_url(url)
            .map_err(|e| Error::Config(format!("Sub-agent '{}': {}", name, e)))?;

        Ok(SubAgentEndpoint { name, url })
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!("{}: unsupported scheme {}", raw, scheme))),
    }
}
