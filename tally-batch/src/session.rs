//! Per-session batch state: the consolidated list, progress counters and the
//! selected scope. One `BatchSession` per user/request; nothing is shared.

use log::info;
use tally_core::{summarize, to_csv_string, Scope, Summary, Transaction};
use tally_ingest::Document;

use crate::error::BatchError;
use crate::extractor::Extractor;
use crate::orchestrator::{run_batch, BatchEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Documents whose extraction returned successfully
    pub completed: usize,
    /// Index of the document currently being extracted
    pub current: Option<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSession {
    documents: Vec<String>,
    transactions: Vec<Transaction>,
    progress: Progress,
    last_error: Option<String>,
    scope: Scope,
}

impl BatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a batch, replacing whatever the session held before.
    ///
    /// Returns `Ok(None)` without touching the session when `docs` is empty.
    /// On failure the session is left empty with `last_error` set.
    pub async fn run<E: Extractor + ?Sized>(
        &mut self,
        extractor: &E,
        docs: &[Document],
        mut on_event: impl FnMut(BatchEvent) + Send,
    ) -> Result<Option<usize>, BatchError> {
        if docs.is_empty() {
            info!("batch refused: no documents");
            return Ok(None);
        }

        self.documents.clear();
        self.transactions.clear();
        self.last_error = None;
        self.scope = Scope::All;
        self.progress = Progress {
            completed: 0,
            current: None,
            total: docs.len(),
        };

        let progress = &mut self.progress;
        let result = run_batch(extractor, docs, |ev| {
            match &ev {
                BatchEvent::Processing { index, .. } => progress.current = Some(*index),
                BatchEvent::Completed { completed, .. } => progress.completed = *completed,
                BatchEvent::Failed { .. } | BatchEvent::Finished { .. } => progress.current = None,
                BatchEvent::Started { .. } => {}
            }
            on_event(ev);
        })
        .await;

        self.progress.current = None;
        match result {
            Ok(txns) => {
                self.documents = docs.iter().map(|d| d.name.clone()).collect();
                self.transactions = txns;
                Ok(Some(self.transactions.len()))
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Discard the batch and return to the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Select which documents feed the summary and export.
    pub fn select_scope(&mut self, scope: Scope) -> Result<(), BatchError> {
        if let Scope::Document(name) = &scope {
            if !self.documents.iter().any(|d| d == name) {
                return Err(BatchError::UnknownDocument(name.clone()));
            }
        }
        self.scope = scope;
        Ok(())
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Document names from the last successful run, in submission order
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// The full consolidated list, ignoring scope
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn scoped(&self) -> Vec<Transaction> {
        self.scope.apply(&self.transactions)
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.scoped())
    }

    /// CSV of the scoped list
    pub fn export_csv(&self) -> anyhow::Result<String> {
        to_csv_string(&self.scoped())
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_processing(&self) -> bool {
        self.progress.current.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
