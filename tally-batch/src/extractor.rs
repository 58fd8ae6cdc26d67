use async_trait::async_trait;
use tally_ingest::{Document, ExtractedRecord};

/// The external service that turns one document into transaction records.
///
/// Any failure is reported as a single opaque error; no partial lists.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, doc: &Document) -> anyhow::Result<Vec<ExtractedRecord>>;
}
