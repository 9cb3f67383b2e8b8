pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod news;
pub mod resolver;
pub mod scheduler;
pub mod store;

pub use context::GatewayContext;
pub use error::RestError;
