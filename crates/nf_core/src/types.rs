use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single feed entry that passed the recency filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    /// URL of the feed the entry was read from.
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub feed_url: String,
    pub max_articles: usize,
    pub recency_window: Duration,
}

impl FeedQuery {
    pub fn new(feed_url: impl Into<String>, max_articles: usize, recency_window: Duration) -> Self {
        Self {
            feed_url: feed_url.into(),
            max_articles,
            recency_window,
        }
    }

    /// Oldest publication time still accepted when the query runs at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.recency_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
