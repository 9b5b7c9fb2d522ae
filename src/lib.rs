pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod graphql;
pub mod query;

pub use catalog::Catalog;
pub use error::{Result, SbrError, TransportError};
pub use query::{Query, Request, SbrClient};
