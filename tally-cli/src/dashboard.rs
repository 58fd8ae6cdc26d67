//! Plain-text dashboard: totals, expense breakdown and the transaction table.

use std::fmt::Write;
use tally_core::{Scope, Summary, Transaction};

const BAR_WIDTH: usize = 30;

pub fn money(amount: f64, symbol: &str) -> String {
    if amount < 0.0 {
        format!("-{symbol}{:.2}", amount.abs())
    } else {
        format!("{symbol}{amount:.2}")
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

pub fn render_summary(summary: &Summary, scope: &Scope, symbol: &str) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "# {scope}\n");
    let _ = writeln!(s, "Transactions: {}", summary.count);
    let _ = writeln!(s, "Income:       {}", money(summary.income, symbol));
    let _ = writeln!(s, "Expenses:     {}", money(summary.expenses, symbol));
    let _ = writeln!(s, "Net:          {}", money(summary.net, symbol));

    if summary.categories.is_empty() {
        let _ = writeln!(s, "\n(no expenses)");
        return s;
    }

    let _ = writeln!(s, "\n## Expenses by category\n");
    let name_w = summary
        .categories
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    for c in &summary.categories {
        let filled = ((c.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            s,
            "{:<name_w$}  {:>12}  {:>5.1}%  {}",
            truncate(&c.name, name_w),
            money(c.value, symbol),
            c.percentage,
            "█".repeat(filled.min(BAR_WIDTH)),
        );
    }
    s
}

/// Transaction table; `limit` of 0 prints every row.
pub fn render_table(txns: &[Transaction], symbol: &str, limit: usize) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:<10}  {:<32}  {:>12}  {:<16}  {}",
        "Date", "Description", "Amount", "Category", "Source"
    );
    let shown = if limit == 0 { txns.len() } else { limit.min(txns.len()) };
    for t in &txns[..shown] {
        let _ = writeln!(
            s,
            "{:<10}  {:<32}  {:>12}  {:<16}  {}",
            truncate(&t.date, 10),
            truncate(&t.description, 32),
            money(t.amount, symbol),
            truncate(&t.category, 16),
            t.source_file
        );
    }
    if shown < txns.len() {
        let _ = writeln!(s, "… {} more", txns.len() - shown);
    }
    s
}
