use std::fmt::Write;

use chrono::{Duration, SecondsFormat};
use futures::future::join_all;
use nf_core::{Article, FeedQuery, FetcherConfig};

use crate::feed::FeedFetcher;

pub const NO_ARTICLES_MESSAGE: &str = "No recent articles found";

/// Fetches every configured feed and merges the results newest-first.
#[derive(Debug, Clone)]
pub struct FeedAggregator {
    fetcher: FeedFetcher,
    feeds: Vec<String>,
    max_articles_per_feed: usize,
    recency_window: Duration,
    listing_limit: usize,
}

/// Merged articles plus the number of feeds that were read successfully.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub articles: Vec<Article>,
    /// Feeds retrieved and parsed without error. Unreachable or unparsable
    /// feeds are left out of this count even though they are still attempted.
    pub feeds_ok: usize,
}

impl FeedAggregator {
    pub fn new(fetcher: FeedFetcher, config: &FetcherConfig) -> Self {
        Self {
            fetcher,
            feeds: config.feeds.clone(),
            max_articles_per_feed: config.max_articles_per_feed,
            recency_window: config.recency_window(),
            listing_limit: config.listing_limit,
        }
    }

    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    pub async fn collect(&self) -> Aggregate {
        let fetches = self.feeds.iter().map(|feed_url| {
            let query = FeedQuery::new(feed_url.as_str(), self.max_articles_per_feed, self.recency_window);
            async move { (query.feed_url.clone(), self.fetcher.try_fetch(&query).await) }
        });

        let mut aggregate = Aggregate::default();
        for (feed_url, result) in join_all(fetches).await {
            match result {
                Ok(articles) => {
                    tracing::info!("Retrieved {} articles from {}", articles.len(), feed_url);
                    aggregate.feeds_ok += 1;
                    aggregate.articles.extend(articles.into_iter().map(|article| Article {
                        source: feed_url.clone(),
                        ..article
                    }));
                }
                Err(e) => tracing::error!("Error processing feed {}: {}", feed_url, e),
            }
        }

        sort_newest_first(&mut aggregate.articles);
        aggregate
    }

    /// Numbered text listing of the newest articles across all feeds.
    pub async fn listing(&self) -> String {
        let aggregate = self.collect().await;
        if aggregate.articles.is_empty() {
            tracing::info!("No articles found from any feed");
            return NO_ARTICLES_MESSAGE.to_string();
        }
        format_listing(&aggregate, self.listing_limit)
    }
}

pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

pub fn format_listing(aggregate: &Aggregate, limit: usize) -> String {
    if aggregate.articles.is_empty() {
        return NO_ARTICLES_MESSAGE.to_string();
    }

    let mut out = format!(
        "Found {} recent articles from {} feeds:\n\n",
        aggregate.articles.len(),
        aggregate.feeds_ok
    );
    for (i, article) in aggregate.articles.iter().take(limit).enumerate() {
        let _ = write!(
            out,
            "{}. {}\n   URL: {}\n   Date: {}\n\n",
            i + 1,
            article.title,
            article.url,
            article.published_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(title: &str, day: u32, source: &str) -> Article {
        Article {
            url: format!("https://example.com/{}", title.to_lowercase()),
            title: title.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_sort_across_feeds() {
        let mut articles = vec![article("A", 1, "feed-a"), article("B", 2, "feed-b"), article("C", 3, "feed-a")];
        sort_newest_first(&mut articles);
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_format_listing() {
        let aggregate = Aggregate {
            articles: vec![article("Second", 2, "feed-b"), article("First", 1, "feed-a")],
            feeds_ok: 2,
        };
        let listing = format_listing(&aggregate, 50);
        assert_eq!(
            listing,
            "Found 2 recent articles from 2 feeds:\n\n\
             1. Second\n   URL: https://example.com/second\n   Date: 2024-05-02T08:00:00Z\n\n\
             2. First\n   URL: https://example.com/first\n   Date: 2024-05-01T08:00:00Z\n\n"
        );
    }

    #[test]
    fn test_format_listing_limit() {
        let aggregate = Aggregate {
            articles: (1..=5).map(|day| article(&format!("T{}", day), day, "feed")).collect(),
            feeds_ok: 1,
        };
        let listing = format_listing(&aggregate, 3);
        assert!(listing.starts_with("Found 5 recent articles from 1 feeds:"));
        assert!(listing.contains("3. T3"));
        assert!(!listing.contains("4. T4"));
    }

    #[test]
    fn test_format_empty_listing() {
        assert_eq!(format_listing(&Aggregate::default(), 50), NO_ARTICLES_MESSAGE);
    }
}
