use super::Transport;
use crate::config::Config;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// POSTs `{"query": ...}` to the odds service endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(
            &config.endpoint(),
            Duration::from_millis(config.service.request_timeout_ms),
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, query: &str) -> Result<Value, TransportError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("request to {} failed: {}", self.endpoint, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Server(format!("HTTP {}: {}", status, body)));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("failed to read response body: {}", e)))?;
        parse_body(&text)
    }
}

/// Decode a 2xx body. Undecodable JSON is a server error.
fn parse_body(text: &str) -> Result<Value, TransportError> {
    let body: Value = serde_json::from_str(text)
        .map_err(|e| TransportError::Server(format!("response is not valid JSON: {}", e)))?;
    extract_data(body)
}

/// Pull `data` out of a GraphQL response body, surfacing any `errors`.
fn extract_data(mut body: Value) -> Result<Value, TransportError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect();
            return Err(TransportError::Server(messages.join("; ")));
        }
    }
    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(TransportError::Server("response has no data".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_data() {
        let body = json!({ "data": { "leagues": [ { "lid": 16 } ] } });
        assert_eq!(extract_data(body).unwrap(), json!({ "leagues": [ { "lid": 16 } ] }));
    }

    #[test]
    fn test_graphql_errors_are_server_errors() {
        let body = json!({
            "data": null,
            "errors": [ { "message": "Cannot query field \"foo\"" }, { "message": "bad arg" } ]
        });
        assert_eq!(
            extract_data(body).unwrap_err(),
            TransportError::Server("Cannot query field \"foo\"; bad arg".to_string())
        );
        assert!(matches!(
            extract_data(json!({})),
            Err(TransportError::Server(_))
        ));
    }

    #[test]
    fn test_non_json_body_is_server_error() {
        assert!(matches!(
            parse_body("<html>502 Bad Gateway</html>"),
            Err(TransportError::Server(_))
        ));
        assert_eq!(parse_body(r#"{"data":{"team":{"tmid":1}}}"#).unwrap(), json!({ "team": { "tmid": 1 } }));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let transport = HttpTransport::new("http://localhost:4000/graphql/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.endpoint, "http://localhost:4000/graphql");
    }
}
