//! HTTP client for the InfluxDB v2 write endpoint.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::delivery::config::DeliveryConfig;
use crate::delivery::point::Point;

/// Per-request timeout; a hung write must fail fast enough for the bounded
/// retry schedule to stay meaningful.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by a point write.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("write transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server received the request and rejected it.
    #[error("server rejected write ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Sink for batches of points.
///
/// The batch is atomic from the caller's perspective: it is accepted or
/// rejected as a whole, and a failed call may be retried verbatim.
#[async_trait]
pub trait PointWriter {
    async fn write(&self, points: &[Point]) -> std::result::Result<(), DeliveryError>;
}

/// Client for `POST /api/v2/write` on an InfluxDB v2 instance.
pub struct InfluxClient {
    http: reqwest::Client,
    config: DeliveryConfig,
}

impl InfluxClient {
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn write_url(&self) -> String {
        format!("{}/api/v2/write", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PointWriter for InfluxClient {
    async fn write(&self, points: &[Point]) -> std::result::Result<(), DeliveryError> {
        let body = points
            .iter()
            .map(Point::to_line_protocol)
            .collect::<Vec<_>>()
            .join("\n");

        let response = self
            .http
            .post(self.write_url())
            .timeout(WRITE_TIMEOUT)
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
            ])
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DeliveryConfig {
        DeliveryConfig {
            url: url.to_string(),
            bucket: "solar".to_string(),
            org: "home".to_string(),
            token: "secret".to_string(),
        }
    }

    #[test]
    fn test_write_url_joins_cleanly() {
        let client = InfluxClient::new(config("http://influx.local:8086"));
        assert_eq!(client.write_url(), "http://influx.local:8086/api/v2/write");

        let client = InfluxClient::new(config("http://influx.local:8086/"));
        assert_eq!(client.write_url(), "http://influx.local:8086/api/v2/write");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        // Port 1 on loopback refuses the connection immediately.
        let client = InfluxClient::new(config("http://127.0.0.1:1"));
        let points = [Point::new("site", 1.0)];
        match client.write(&points).await {
            Err(DeliveryError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other.err()),
        }
    }
}
