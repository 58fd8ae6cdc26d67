//! tally-core: transaction model, scope filtering, summaries and CSV export

pub mod export;
pub mod scope;
pub mod summary;
pub mod transaction;

pub use export::{export_file_name, read_csv, to_csv_string, write_csv};
pub use scope::Scope;
pub use summary::{summarize, CategorySummary, Summary, PALETTE};
pub use transaction::{Transaction, UNCATEGORIZED};
