use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("No documents to process")]
    Empty,

    #[error("Failed to extract transactions from {name} (document {} of the batch): {message}", .index + 1)]
    Extraction {
        index: usize,
        name: String,
        message: String,
    },

    #[error("Duplicate document name in batch: {0}")]
    DuplicateDocument(String),

    #[error("Unknown document: {0}")]
    UnknownDocument(String),
}
