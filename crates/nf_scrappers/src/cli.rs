use clap::Subcommand;
use nf_core::{FetcherConfig, Result, SubAgentEndpoint};

use crate::aggregate::FeedAggregator;
use crate::client::HttpClient;
use crate::extract::ContentExtractor;
use crate::feed::FeedFetcher;

#[derive(Subcommand, Debug, Clone)]
pub enum NewsCommands {
    /// Print recent article titles and URLs from all feeds
    Fetch,
    /// Print the readable text of an article
    Extract {
        /// The article URL
        url: String,
    },
    /// List the configured feeds
    Feeds,
    /// Validate and list the sub-agent endpoints from SUB_AGENTS
    Agents {
        /// Send a GET to every endpoint and report the result
        #[arg(long)]
        probe: bool,
    },
}

pub async fn handle_command(command: NewsCommands, config: &FetcherConfig) -> Result<()> {
    match command {
        NewsCommands::Fetch => {
            config.validate()?;
            let client = HttpClient::new(config)?;
            let aggregator = FeedAggregator::new(FeedFetcher::new(client), config);
            println!("{}", aggregator.listing().await);
        }
        NewsCommands::Extract { url } => {
            let extractor = ContentExtractor::new(HttpClient::new(config)?);
            println!("{}", extractor.extract(&url).await);
        }
        NewsCommands::Feeds => {
            println!("Configured feeds:");
            for feed in &config.feeds {
                println!("  {}", feed);
            }
            println!(
                "Up to {} articles per feed from the last {}",
                config.max_articles_per_feed, config.recency
            );
        }
        NewsCommands::Agents { probe } => {
            let agents = SubAgentEndpoint::from_env()?;
            if agents.is_empty() {
                println!("No sub-agents configured");
                return Ok(());
            }

            let client = if probe { Some(HttpClient::new(config)?) } else { None };
            for agent in &agents {
                match &client {
                    Some(client) => match client.status(agent.url.as_str()).await {
                        Ok(status) => println!("{} {} ({})", status_marker(status.is_success()), agent.name, status),
                        Err(e) => println!("{} {} ({})", status_marker(false), agent.name, e),
                    },
                    None => println!("  {} -> {}", agent.name, agent.url),
                }
            }
        }
    }
    Ok(())
}

fn status_marker(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}
