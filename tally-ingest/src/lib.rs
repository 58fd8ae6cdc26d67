//! tally-ingest: uploaded statement documents and the record shape the extraction model returns.

pub mod error;
pub mod response;
pub mod types;

pub use error::IngestError;
pub use response::{normalize_date, parse_extraction_response, EXTRACTION_PROMPT};
pub use types::{Document, ExtractedRecord, MediaType};
