use crate::chunker::Chunk;
use crate::config::{SinkConfig, UserAgentConfig};
use crate::sink::{ChunkSink, DeliveryError};
use crate::{ConfigError, CrawlerError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// Wire format accepted by the embedding service
///
/// `title` is always present; pages without one send an empty string.
#[derive(Debug, Serialize)]
pub struct EmbeddingRecord<'a> {
    pub content: &'a str,
    pub url: &'a str,
    pub position: u64,
    pub collection_name: &'a str,
    pub title: &'a str,
}

impl<'a> EmbeddingRecord<'a> {
    pub fn new(chunk: &'a Chunk, collection_name: &'a str) -> Self {
        Self {
            content: &chunk.content,
            url: &chunk.source_url,
            position: chunk.position,
            collection_name,
            title: chunk.title.as_deref().unwrap_or_default(),
        }
    }
}

/// Posts each chunk as JSON to the embedding service
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: Url,
    collection_name: String,
}

impl HttpSink {
    pub fn new(client: Client, endpoint: Url, collection_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            collection_name: collection_name.into(),
        }
    }

    /// Builds the sink with its own client, timeout and user agent
    pub fn from_config(
        config: &SinkConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, CrawlerError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid sink endpoint '{}': {}", config.endpoint, e))
        })?;

        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::new(client, endpoint, &config.collection_name))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChunkSink for HttpSink {
    async fn deliver(&self, chunk: &Chunk) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(&EmbeddingRecord::new(chunk, &self.collection_name))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        Ok(())
    }
}
