use std::sync::Arc;

use async_trait::async_trait;
use nf_core::{Error, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::FeedAggregator;
use crate::extract::ContentExtractor;

/// An operation an agent runtime can call by name.
///
/// Tools answer with text meant to be read by an LLM. Only malformed
/// arguments produce an `Err`; upstream failures are reported in the text.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, args: Value) -> Result<String>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

pub struct FetchArticlesTool {
    aggregator: FeedAggregator,
}

impl FetchArticlesTool {
    pub const NAME: &'static str = "fetch_article_titles_and_urls";

    pub fn new(aggregator: FeedAggregator) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl Tool for FetchArticlesTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Fetch recent article titles and URLs from all configured RSS feeds, newest first."
    }

    async fn call(&self, _args: Value) -> Result<String> {
        tracing::info!("Tool called: {}", Self::NAME);
        Ok(self.aggregator.listing().await)
    }
}

pub struct ExtractContentTool {
    extractor: ContentExtractor,
}

impl ExtractContentTool {
    pub const NAME: &'static str = "extract_article_content";

    pub fn new(extractor: ContentExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Tool for ExtractContentTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Extract the main readable text of the article at the given URL."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "article_url": { "type": "string", "description": "URL of the article page" }
            },
            "required": ["article_url"]
        })
    }

    async fn call(&self, args: Value) -> Result<String> {
        let article_url = args
            .get("article_url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::InvalidArguments("missing string argument 'article_url'".to_string()))?;

        tracing::info!("Tool called: {} ({})", Self::NAME, article_url);
        Ok(self.extractor.extract(article_url).await)
    }
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The news fetcher tool set: article listing and content extraction.
    pub fn news(aggregator: FeedAggregator, extractor: ContentExtractor) -> Self {
        let mut registry = Self::new();
        registry.register(FetchArticlesTool::new(aggregator));
        registry.register(ExtractContentTool::new(extractor));
        registry
    }

    /// Adds a tool, replacing any tool registered under the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect()
    }
}
