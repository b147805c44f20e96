use scraper::{ElementRef, Html, Selector};

use crate::client::HttpClient;
use crate::logging::Logger;

/// Upper bound, in characters, of every string `extract` returns.
pub const MAX_CONTENT_CHARS: usize = 3000;

/// Paragraphs this short or shorter are treated as boilerplate.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "noscript"];

/// Turns an article page into plain text for summarization.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: HttpClient,
}

impl ContentExtractor {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Never fails: retrieval errors and empty pages come back as a
    /// human-readable diagnostic instead of content.
    pub async fn extract(&self, article_url: &str) -> String {
        let logger = Logger::new().with_prefix(format!("[article {}]", article_url));
        logger.info("Extracting content");

        let html = match self.client.get_text(article_url).await {
            Ok(html) => html,
            Err(e) => {
                logger.error(&format!("Extraction failed: {}", e));
                return truncate_chars(
                    &format!("Could not extract content from the article URL: {}", e),
                    MAX_CONTENT_CHARS,
                );
            }
        };

        let content = extract_text(&html);
        if content.is_empty() {
            logger.warn("No readable paragraphs");
            return truncate_chars(&format!("No readable content found at {}", article_url), MAX_CONTENT_CHARS);
        }

        logger.info(&format!("Extracted {} characters", content.chars().count()));
        content
    }
}

/// Joins the substantial `<p>` paragraphs of a page, skipping anything nested
/// in scripts, styles or page chrome, and caps the result at
/// [`MAX_CONTENT_CHARS`].
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(paragraphs) = Selector::parse("p") else {
        return String::new();
    };

    let content = document
        .select(&paragraphs)
        .map(visible_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&content, MAX_CONTENT_CHARS)
}

/// Whitespace-normalized text of `element`, minus text under skipped elements.
fn visible_text(element: ElementRef) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |el| SKIPPED_ELEMENTS.contains(&el.name()))
            });
            (!hidden).then_some(&**text)
        })
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
