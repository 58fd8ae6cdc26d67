use std::fs;
use tally_ingest::{Document, IngestError, MediaType};

#[test]
fn test_load_pdf_uses_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("March Statement.PDF");
    fs::write(&path, b"%PDF-1.4 fake").unwrap();

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.name, "March Statement.PDF");
    assert_eq!(doc.media_type, MediaType::Pdf);
    assert_eq!(doc.bytes, b"%PDF-1.4 fake");
    assert!(doc.data_url().starts_with("data:application/pdf;base64,"));
}

#[test]
fn test_load_rejects_unknown_extension_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statement.csv");

    // The file does not exist: the type check must fail first.
    let err = Document::load(&path).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedMediaType(_)));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::load(dir.path().join("gone.png")).unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
}
