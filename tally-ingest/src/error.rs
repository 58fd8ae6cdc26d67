use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file type: {0} (expected PDF, PNG, JPEG, WEBP or HEIC)")]
    UnsupportedMediaType(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
