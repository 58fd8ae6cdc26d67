//! CSV export of the scoped transaction list, and reading it back.
//!
//! Row layout: `Date,Description,Amount,Category,Notes,Source`.
//! Description, Notes and Source are always quoted; Date and Category only
//! when they would otherwise break the row. Amount is never quoted.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;

use crate::scope::Scope;
use crate::transaction::{Transaction, UNCATEGORIZED};

pub const HEADER: [&str; 6] = ["Date", "Description", "Amount", "Category", "Notes", "Source"];

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}

fn row(t: &Transaction) -> [String; 6] {
    [
        quote_if_needed(&t.date),
        quote(&t.description),
        t.amount.to_string(),
        quote_if_needed(&t.category),
        quote(&t.notes),
        quote(&t.source_file),
    ]
}

/// Write the header plus one row per transaction, in list order.
pub fn write_csv<W: io::Write>(writer: W, txns: &[Transaction]) -> Result<()> {
    // Quoting is applied per column above, so the writer must not add its own.
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for t in txns {
        wtr.write_record(row(t))?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

pub fn to_csv_string(txns: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, txns)?;
    Ok(String::from_utf8(buf)?)
}

/// Default file name for an export of `scope`
pub fn export_file_name(scope: &Scope) -> String {
    format!("transactions_{}.csv", scope.label())
}

/// Read a file in the export format back into transactions.
///
/// Ids are not part of the export, so rows get fresh `csv-NNNNN` ids.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_records(rdr)
}

pub fn read_csv_str(s: &str) -> Result<Vec<Transaction>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(s.as_bytes());
    read_records(rdr)
}

fn read_records<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<Transaction>> {
    let mut txns = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let amount_raw = record.get(2).unwrap_or("").trim();
        let amount: f64 = amount_raw
            .parse()
            .with_context(|| format!("row {}: invalid amount '{}'", i + 1, amount_raw))?;

        let category = record.get(3).unwrap_or("").trim();
        let category = if category.is_empty() { UNCATEGORIZED } else { category };

        txns.push(
            Transaction::new(
                format!("csv-{i:05}"),
                record.get(0).unwrap_or("").trim(),
                record.get(1).unwrap_or(""),
                amount,
                category,
                record.get(5).unwrap_or(""),
            )
            .with_notes(record.get(4).unwrap_or("")),
        );
    }
    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_description_row() {
        let t = Transaction::new("txn-00000", "2024-01-05", "Coffee \"Shop\"", -4.5, "Dining", "a.pdf");
        let out = to_csv_string(&[t]).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Date,Description,Amount,Category,Notes,Source");
        assert_eq!(lines[1], r#"2024-01-05,"Coffee ""Shop""",-4.5,Dining,"","a.pdf""#);
    }

    #[test]
    fn test_integer_amount_has_no_decimal_point() {
        let t = Transaction::new("txn-00000", "2024-01-06", "Payroll", 100.0, "Income", "b.pdf");
        let out = to_csv_string(&[t]).unwrap();
        assert!(out.lines().nth(1).unwrap().contains(",100,"));
    }

    #[test]
    fn test_category_with_comma_is_quoted() {
        let t = Transaction::new("txn-00000", "2024-01-06", "Dinner", -30.0, "Food, Drink", "b.pdf");
        let out = to_csv_string(&[t]).unwrap();
        assert!(out.contains(r#","Food, Drink","#));
    }

    #[test]
    fn test_empty_list_is_header_only() {
        let out = to_csv_string(&[]).unwrap();
        assert_eq!(out.trim_end(), "Date,Description,Amount,Category,Notes,Source");
    }

    #[test]
    fn test_read_back_export() {
        let txns = vec![
            Transaction::new("txn-00000", "2024-01-05", "Coffee \"Shop\"", -4.5, "Dining", "a.pdf")
                .with_notes("morning, early"),
            Transaction::new("txn-00001", "2024-01-06", "Payroll", 2500.0, "Income", "b.pdf"),
        ];
        let back = read_csv_str(&to_csv_string(&txns).unwrap()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].description, "Coffee \"Shop\"");
        assert_eq!(back[0].notes, "morning, early");
        assert_eq!(back[0].amount, -4.5);
        assert_eq!(back[1].source_file, "b.pdf");
        assert_eq!(back[1].id, "csv-00001");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(&Scope::All), "transactions_all.csv");
        assert_eq!(
            export_file_name(&Scope::Document("jan.pdf".to_string())),
            "transactions_jan.pdf.csv"
        );
    }
}
