use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use nf_core::{FetcherConfig, Result, SubAgentEndpoint};
use nf_scrappers::{handle_command, init_logging, NewsCommands};
use nf_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "RSS news fetcher and article extractor exposed as agent tools", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    config: FetcherConfig,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the tools and the health endpoint over HTTP
    Serve {
        #[arg(long, env = "NEWS_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "NEWS_PORT", default_value_t = 8001)]
        port: u16,
    },
    #[command(flatten)]
    News(NewsCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            cli.config.validate()?;
            let agents = SubAgentEndpoint::from_env()?;
            for agent in &agents {
                info!("🤝 Sub-agent {} at {}", agent.name, agent.url);
            }

            info!(
                "📰 Watching {} feeds (max {} articles each, last {})",
                cli.config.feeds.len(),
                cli.config.max_articles_per_feed,
                cli.config.recency
            );
            let state = AppState::from_config(&cli.config)?;
            nf_web::serve(SocketAddr::new(host, port), state).await?;
        }
        Commands::News(command) => handle_command(command, &cli.config).await?,
    }

    Ok(())
}
