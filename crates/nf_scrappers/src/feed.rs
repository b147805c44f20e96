use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed};
use nf_core::{Article, Error, FeedQuery, Result};

use crate::client::HttpClient;
use crate::logging::Logger;

/// Reads one RSS/Atom feed and keeps the recent entries.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: HttpClient,
}

impl FeedFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Returns the recent articles of a feed, or nothing if the feed could not
    /// be retrieved or parsed.
    pub async fn fetch(&self, query: &FeedQuery) -> Vec<Article> {
        match self.try_fetch(query).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("Error fetching feed {}: {}", query.feed_url, e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(&self, query: &FeedQuery) -> Result<Vec<Article>> {
        let logger = Logger::new().with_prefix(format!("[feed {}]", query.feed_url));
        logger.info(&format!(
            "Fetching (max_articles={}, recency={}d)",
            query.max_articles,
            query.recency_window.num_days()
        ));

        let body = self.client.get_bytes(&query.feed_url).await?;
        let feed = parse_feed(&body)?;
        logger.info(&format!("Retrieved {} entries", feed.entries.len()));

        let selection = select_recent(&feed, query, Utc::now());
        logger.info(&format!(
            "{} articles accepted, {} filtered out",
            selection.articles.len(),
            selection.filtered
        ));

        Ok(selection.articles)
    }
}

pub fn parse_feed(body: &[u8]) -> Result<Feed> {
    feed_rs::parser::parse(body).map_err(|e| Error::Feed(e.to_string()))
}

#[derive(Debug, Default)]
pub struct Selection {
    pub articles: Vec<Article>,
    /// Entries rejected as too old, undated or without a link.
    pub filtered: usize,
}

/// Walks entries in feed order, keeping those published at or after the
/// query's cutoff until `max_articles` have been accepted.
pub fn select_recent(feed: &Feed, query: &FeedQuery, now: DateTime<Utc>) -> Selection {
    let cutoff = query.cutoff(now);
    let mut selection = Selection::default();

    for entry in &feed.entries {
        if selection.articles.len() >= query.max_articles {
            break;
        }

        match entry_to_article(entry, &query.feed_url) {
            Some(article) if article.published_at >= cutoff => selection.articles.push(article),
            _ => selection.filtered += 1,
        }
    }

    selection
}

fn entry_to_article(entry: &Entry, source: &str) -> Option<Article> {
    let published_at = entry.published.or(entry.updated)?;
    let url = article_link(entry)?;
    if url.is_empty() {
        return None;
    }

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    Some(Article {
        url,
        title,
        published_at,
        source: source.to_string(),
    })
}

/// The entry's page link: the first `alternate` (or untyped) link, else the
/// first link of any kind. Atom entries often list `replies`, `edit` and
/// `self` links ahead of it.
fn article_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|link| link.rel.as_deref().map_or(true, |rel| rel.eq_ignore_ascii_case("alternate")))
        .or_else(|| entry.links.first())
        .map(|link| link.href.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use nf_core::FetcherConfig;

    const FEED_URL: &str = "https://example.com/feed";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn item(title: &str, link: &str, age_days: i64) -> String {
        format!(
            "<item><title>{}</title><link>{}</link><pubDate>{}</pubDate></item>",
            title,
            link,
            (now() - Duration::days(age_days)).to_rfc2822()
        )
    }

    fn rss(items: &[String]) -> Feed {
        let xml = format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Test</title><link>https://example.com</link><description>d</description>{}</channel></rss>"#,
            items.join("")
        );
        parse_feed(xml.as_bytes()).unwrap()
    }

    fn query(max_articles: usize) -> FeedQuery {
        FeedQuery::new(FEED_URL, max_articles, Duration::days(90))
    }

    #[test]
    fn test_excludes_old_entries() {
        let feed = rss(&[
            item("Fresh", "https://example.com/fresh", 1),
            item("Stale", "https://example.com/stale", 100),
        ]);
        let selection = select_recent(&feed, &query(10), now());
        assert_eq!(selection.articles.len(), 1);
        assert_eq!(selection.articles[0].title, "Fresh");
        assert_eq!(selection.articles[0].url, "https://example.com/fresh");
        assert_eq!(selection.articles[0].source, FEED_URL);
        assert_eq!(selection.filtered, 1);
    }

    #[test]
    fn test_caps_accepted_entries() {
        let items: Vec<String> = (0..25)
            .map(|i| item(&format!("Article {}", i), &format!("https://example.com/{}", i), i % 5))
            .collect();
        let feed = rss(&items);
        let selection = select_recent(&feed, &query(10), now());
        assert_eq!(selection.articles.len(), 10);
        assert_eq!(selection.articles[0].title, "Article 0");
        assert_eq!(selection.articles[9].title, "Article 9");
    }

    #[test]
    fn test_zero_cap() {
        let feed = rss(&[item("Fresh", "https://example.com/fresh", 1)]);
        assert!(select_recent(&feed, &query(0), now()).articles.is_empty());
    }

    #[test]
    fn test_keeps_feed_order() {
        let feed = rss(&[
            item("Older", "https://example.com/older", 5),
            item("Newer", "https://example.com/newer", 1),
        ]);
        let titles: Vec<_> = select_recent(&feed, &query(10), now())
            .articles
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Older", "Newer"]);
    }

    #[test]
    fn test_skips_undated_entries() {
        let feed = rss(&[
            "<item><title>Undated</title><link>https://example.com/undated</link></item>".to_string(),
            item("Dated", "https://example.com/dated", 2),
        ]);
        let selection = select_recent(&feed, &query(10), now());
        assert_eq!(selection.articles.len(), 1);
        assert_eq!(selection.articles[0].title, "Dated");
        assert_eq!(selection.filtered, 1);
    }

    #[test]
    fn test_atom_updated_fallback() {
        let updated = (now() - Duration::days(3)).to_rfc3339();
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <feed xmlns="http://www.w3.org/2005/Atom">
              <title>Atom</title><id>urn:feed</id><updated>{updated}</updated>
              <entry>
                <title>Atom entry</title><id>urn:entry</id>
                <link href="https://example.com/atom-entry"/>
                <updated>{updated}</updated>
              </entry>
            </feed>"#
        );
        let feed = parse_feed(xml.as_bytes()).unwrap();
        let selection = select_recent(&feed, &query(10), now());
        assert_eq!(selection.articles.len(), 1);
        assert_eq!(selection.articles[0].url, "https://example.com/atom-entry");
    }

    #[test]
    fn test_atom_prefers_alternate_link() {
        let updated = (now() - Duration::days(1)).to_rfc3339();
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <feed xmlns="http://www.w3.org/2005/Atom">
              <title>Blog</title><id>urn:blog</id><updated>{updated}</updated>
              <entry>
                <title>Post</title><id>urn:post</id>
                <published>{updated}</published><updated>{updated}</updated>
                <link rel="replies" type="application/atom+xml" href="https://blog.example/feeds/1/comments/default"/>
                <link rel="edit" type="application/atom+xml" href="https://blog.example/feeds/posts/default/1"/>
                <link rel="self" type="application/atom+xml" href="https://blog.example/feeds/posts/default/1"/>
                <link rel="alternate" type="text/html" href="https://blog.example/2024/05/post.html"/>
              </entry>
              <entry>
                <title>Self only</title><id>urn:self-only</id>
                <updated>{updated}</updated>
                <link rel="self" href="https://blog.example/feeds/posts/default/2"/>
              </entry>
            </feed>"#
        );
        let feed = parse_feed(xml.as_bytes()).unwrap();
        let selection = select_recent(&feed, &query(10), now());
        assert_eq!(selection.articles.len(), 2);
        assert_eq!(selection.articles[0].url, "https://blog.example/2024/05/post.html");
        assert_eq!(selection.articles[1].url, "https://blog.example/feeds/posts/default/2");
    }

    #[test]
    fn test_parse_invalid_feed() {
        assert!(matches!(parse_feed(b"<html>nope</html>"), Err(Error::Feed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_empty() {
        let fetcher = FeedFetcher::new(HttpClient::new(&FetcherConfig::default()).unwrap());
        let articles = fetcher
            .fetch(&FeedQuery::new("http://127.0.0.1:1/feed.xml", 10, Duration::days(90)))
            .await;
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_empty() {
        let fetcher = FeedFetcher::new(HttpClient::new(&FetcherConfig::default()).unwrap());
        assert!(fetcher.fetch(&FeedQuery::new("not a url", 10, Duration::days(90))).await.is_empty());
    }
}
