//! tally-batch: sequential extraction over a batch of documents, and the per-session state around it

pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod session;

pub use error::BatchError;
pub use extractor::Extractor;
pub use orchestrator::{run_batch, validate_documents, BatchEvent};
pub use session::{BatchSession, Progress};
