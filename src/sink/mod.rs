//! Ingestion sink for chunk delivery
//!
//! The sink is the external indexing service that accepts one chunk per
//! request. This module defines the delivery contract (`ChunkSink`), the HTTP
//! adapter used in production and the worker that drains the bounded chunk
//! channel into a sink.

mod delivery;
mod http;

pub use delivery::{run_delivery, DeliveryReport};
pub use http::{EmbeddingRecord, HttpSink};

use crate::chunker::Chunk;
use async_trait::async_trait;
use thiserror::Error;

/// Reason a single chunk was not accepted by the sink
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Sink unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Sink rejected chunk with HTTP {0}")]
    Status(u16),

    #[error("Failed to encode chunk: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for emitted chunks
///
/// Implementations deliver exactly one chunk per call and report the outcome.
/// They must tolerate repeated delivery of the same `(url, position)` pair; the
/// crawler does not deduplicate.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    async fn deliver(&self, chunk: &Chunk) -> Result<(), DeliveryError>;
}
