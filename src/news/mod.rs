pub mod config;
pub mod error;
pub mod fetcher;
pub mod fingerprint;
pub mod mock;
pub mod types;

pub use error::FetchError;
pub use fetcher::{ArticleFetcher, NewsApiClient};
pub use fingerprint::{fingerprint, Fingerprint};
pub use mock::ScriptedFetcher;
pub use types::*;
