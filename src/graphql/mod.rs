pub mod http;
pub mod request;

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;

/// Executes GraphQL query text against the odds service and returns the
/// response's `data` tree.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, query: &str) -> Result<Value, TransportError>;
}
