//! Sequential batch orchestration.
//!
//! Documents are extracted one at a time in submission order. The first
//! failure aborts the run and nothing extracted so far is returned.

use log::{info, warn};
use std::collections::HashSet;
use tally_core::{Transaction, UNCATEGORIZED};
use tally_ingest::{normalize_date, Document, ExtractedRecord};

use crate::error::BatchError;
use crate::extractor::Extractor;

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started { total: usize },
    Processing { index: usize, name: String },
    Completed { completed: usize, total: usize },
    Failed { index: usize, name: String, message: String },
    Finished { transactions: usize },
}

/// Refuse empty batches and batches where two documents share a name.
pub fn validate_documents(docs: &[Document]) -> Result<(), BatchError> {
    if docs.is_empty() {
        return Err(BatchError::Empty);
    }
    let mut seen = HashSet::new();
    for doc in docs {
        if !seen.insert(doc.name.as_str()) {
            return Err(BatchError::DuplicateDocument(doc.name.clone()));
        }
    }
    Ok(())
}

fn to_transaction(id: usize, rec: ExtractedRecord, source_file: &str) -> Transaction {
    let category = rec
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    Transaction::new(
        format!("txn-{id:05}"),
        normalize_date(&rec.date),
        rec.description.trim(),
        rec.amount,
        category,
        source_file,
    )
    .with_notes(rec.notes.unwrap_or_default())
}

/// Run every document through `extractor` and return the consolidated list.
pub async fn run_batch<E: Extractor + ?Sized>(
    extractor: &E,
    docs: &[Document],
    mut on_event: impl FnMut(BatchEvent) + Send,
) -> Result<Vec<Transaction>, BatchError> {
    validate_documents(docs)?;

    let total = docs.len();
    on_event(BatchEvent::Started { total });

    let mut all: Vec<Transaction> = Vec::new();
    for (index, doc) in docs.iter().enumerate() {
        on_event(BatchEvent::Processing {
            index,
            name: doc.name.clone(),
        });
        info!("extracting {} ({}/{})", doc.name, index + 1, total);

        let records = match extractor.extract(doc).await {
            Ok(r) => r,
            Err(e) => {
                let message = format!("{e:#}");
                warn!("extraction failed for {}: {}", doc.name, message);
                on_event(BatchEvent::Failed {
                    index,
                    name: doc.name.clone(),
                    message: message.clone(),
                });
                return Err(BatchError::Extraction {
                    index,
                    name: doc.name.clone(),
                    message,
                });
            }
        };

        info!("{}: {} transactions", doc.name, records.len());
        for rec in records {
            let id = all.len();
            all.push(to_transaction(id, rec, &doc.name));
        }

        on_event(BatchEvent::Completed {
            completed: index + 1,
            total,
        });
    }

    on_event(BatchEvent::Finished {
        transactions: all.len(),
    });
    Ok(all)
}
