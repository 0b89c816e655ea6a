// src/publish.rs
//! Forwarding decoded fixes to HTTP sinks

use crate::{
    config::SinkTarget,
    error::{GatewayError, PublishError, Result},
    tracker::Fix,
};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("tk-star-gateway/", env!("CARGO_PKG_VERSION"));

/// Response summary of one publish; any HTTP status counts as delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub url: String,
    pub status: u16,
    pub reason: String,
}

impl std::fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GET {} -> {} {}", self.url, self.status, self.reason)
    }
}

/// Something that can deliver a fix to one sink
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        sink: &SinkTarget,
        fix: &Fix,
    ) -> std::result::Result<PublishOutcome, PublishError>;
}

/// Sends fixes as plain GET requests
#[derive(Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
}

impl HttpPublisher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(
        &self,
        sink: &SinkTarget,
        fix: &Fix,
    ) -> std::result::Result<PublishOutcome, PublishError> {
        let url = sink.url(fix.latitude, fix.longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PublishError::new(&url, e.to_string()))?;

        let status = response.status();
        Ok(PublishOutcome {
            url,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        })
    }
}

/// Publish one fix to every sink in order, one attempt each
pub async fn publish_to_all(
    publisher: &dyn Publisher,
    sinks: &[SinkTarget],
    fix: &Fix,
) -> Vec<std::result::Result<PublishOutcome, PublishError>> {
    let mut results = Vec::with_capacity(sinks.len());
    for sink in sinks {
        results.push(publisher.publish(sink, fix).await);
    }
    results
}
