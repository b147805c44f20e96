pub mod config;
pub mod error;
pub mod types;

pub use config::{FetcherConfig, HumanDuration, SubAgentEndpoint};
pub use error::{Error, Result};
pub use types::{Article, FeedQuery};
