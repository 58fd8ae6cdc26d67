//! Transaction records produced by a batch run

use serde::{Deserialize, Serialize};

/// Grouping key for records that arrive without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single statement line, tagged with the document it came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique across the whole batch, not just the source document
    pub id: String,
    /// Calendar date as extracted (normalized to YYYY-MM-DD when recognizable)
    pub date: String,
    /// Merchant / transaction label
    pub description: String,
    /// Positive = income, negative = expense
    pub amount: f64,
    /// Free-text label from the extraction model
    pub category: String,
    /// Optional annotation; empty when absent
    #[serde(default)]
    pub notes: String,
    /// Name of the originating document
    pub source_file: String,
}

impl Transaction {
    /// Create a new Transaction
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            description: description.into(),
            amount,
            category: category.into(),
            notes: String::new(),
            source_file: source_file.into(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
