use thiserror::Error;

/// Failure reported by the GraphQL transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request never produced a usable HTTP response (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered but rejected or failed the query.
    #[error("server error: {0}")]
    Server(String),
}

/// Main error type for the client library.
#[derive(Error, Debug)]
pub enum SbrError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not find {domain} '{term}'")]
    NotFound { domain: &'static str, term: String },

    #[error("search term '{term}' is ambiguous for {domain}, matching ids: {}", join_ids(.candidates))]
    Ambiguous {
        domain: &'static str,
        term: String,
        candidates: Vec<i64>,
    },

    #[error("query '{query}' does not support {accessor}()")]
    Capability {
        query: &'static str,
        accessor: &'static str,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("configuration error: {0}")]
    Config(String),
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, SbrError>;
