pub mod aggregate;
pub mod cli;
pub mod client;
pub mod extract;
pub mod feed;
pub mod logging;
pub mod tools;

pub use aggregate::{FeedAggregator, NO_ARTICLES_MESSAGE};
pub use cli::{handle_command, NewsCommands};
pub use client::HttpClient;
pub use extract::ContentExtractor;
pub use feed::FeedFetcher;
pub use logging::{init_logging, Logger};
pub use tools::{Tool, ToolDescriptor, ToolRegistry};
