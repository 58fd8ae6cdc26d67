//! Decoding of the extraction model's text reply.
//!
//! Models return either a bare JSON array of records or an object with a
//! `transactions` array, sometimes wrapped in a Markdown code fence.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{IngestError, Result};
use crate::types::ExtractedRecord;

pub const EXTRACTION_PROMPT: &str = "\
You are reading a bank or credit card statement. Extract every transaction line.
Return ONLY JSON: an array of objects with these fields:
- date: the transaction date formatted YYYY-MM-DD
- description: the merchant or transaction label as printed
- amount: a number; credits, deposits and refunds are positive, purchases, fees and withdrawals are negative
- category: a short spending category such as Groceries, Dining, Transport, Utilities, Income
- notes: optional short remark, empty string when there is nothing to add
Do not include opening or closing balances, subtotals or summary rows.";

#[derive(Deserialize)]
struct Wrapped {
    transactions: Vec<ExtractedRecord>,
}

fn strip_code_fence(text: &str) -> Result<&str> {
    let text = text.trim();
    // ```json ... ``` or ``` ... ```
    let fence = Regex::new(r"(?s)^```[A-Za-z]*\s*\n?(?P<body>.*?)\s*```$")?;
    Ok(match fence.captures(text).and_then(|caps| caps.name("body")) {
        Some(body) => body.as_str(),
        None => text,
    })
}

/// Decode the model reply into records, in the order the model returned them.
pub fn parse_extraction_response(text: &str) -> Result<Vec<ExtractedRecord>> {
    let body = strip_code_fence(text)?;
    if body.is_empty() {
        return Err(IngestError::MalformedResponse("empty response".to_string()));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| IngestError::MalformedResponse(format!("not JSON: {e}")))?;

    let records = match value {
        Value::Array(_) => serde_json::from_value::<Vec<ExtractedRecord>>(value),
        Value::Object(_) => serde_json::from_value::<Wrapped>(value).map(|w| w.transactions),
        other => {
            return Err(IngestError::MalformedResponse(format!(
                "expected array or object, got {other}"
            )));
        }
    };

    records.map_err(|e| IngestError::MalformedResponse(e.to_string()))
}

// Two-digit years must be tried before four-digit ones: `%Y` happily reads "24".
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
];

/// Normalize a statement date to YYYY-MM-DD. Unrecognized input is returned trimmed but otherwise untouched.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .filter(|d| d.year() >= 1000)
        })
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| s.to_string())
}
