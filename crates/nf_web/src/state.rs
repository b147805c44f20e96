use nf_core::{FetcherConfig, Result};
use nf_scrappers::{ContentExtractor, FeedAggregator, FeedFetcher, HttpClient, ToolRegistry};

pub struct AppState {
    pub tools: ToolRegistry,
}

impl AppState {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Builds the shared HTTP client once and wires the news tools around it.
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        let client = HttpClient::new(config)?;
        let aggregator = FeedAggregator::new(FeedFetcher::new(client.clone()), config);
        let extractor = ContentExtractor::new(client);
        Ok(Self::new(ToolRegistry::news(aggregator, extractor)))
    }
}
