use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transaction::Transaction;

/// Which slice of the consolidated list feeds the summary
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    All,
    Document(String),
}

impl Scope {
    /// `"all"` (any case) selects every document; anything else names one.
    /// A document actually named "all" must be selected with `Scope::Document` directly.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Scope::All
        } else {
            Scope::Document(s.to_string())
        }
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        match self {
            Scope::All => true,
            Scope::Document(name) => txn.source_file == *name,
        }
    }

    /// Filter a consolidated list, preserving order
    pub fn apply(&self, txns: &[Transaction]) -> Vec<Transaction> {
        txns.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    /// Label used in export file names
    pub fn label(&self) -> &str {
        match self {
            Scope::All => "all",
            Scope::Document(name) => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "All documents"),
            Scope::Document(name) => write!(f, "{name}"),
        }
    }
}
