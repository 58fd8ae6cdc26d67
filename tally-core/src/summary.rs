//! Totals and per-category expense breakdown for a scoped transaction list.
//!
//! Income and expenses are reported as magnitudes; only negative amounts feed
//! the category buckets. Zero amounts count as entries but land in neither
//! bucket.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::transaction::Transaction;

/// Display colors, cycled over the sorted categories
pub const PALETTE: [&str; 8] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8", "#82CA9D", "#FFC658", "#FF6B6B",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub name: String,
    /// Sum of absolute expense amounts in this category
    pub value: f64,
    /// Share of total expenses, 0..=100
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub income: f64,
    /// Magnitude of the negative sum
    pub expenses: f64,
    pub net: f64,
    #[serde(rename = "categoryData")]
    pub categories: Vec<CategorySummary>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Compute the summary for an already-scoped list.
pub fn summarize(txns: &[Transaction]) -> Summary {
    let income: f64 = txns.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let raw_expenses: f64 = txns.iter().filter(|t| t.is_expense()).map(|t| t.amount).sum();
    let expenses = raw_expenses.abs();

    // Ordered map: equal values end up sorted by name after the stable sort below.
    let mut buckets: BTreeMap<&str, f64> = BTreeMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        *buckets.entry(t.category.as_str()).or_insert(0.0) += t.abs_amount();
    }

    let mut categories: Vec<CategorySummary> = buckets
        .into_iter()
        .map(|(name, value)| CategorySummary {
            name: name.to_string(),
            value,
            percentage: if expenses > 0.0 { value / expenses * 100.0 } else { 0.0 },
            color: String::new(),
        })
        .collect();

    categories.sort_by(|a, b| b.value.total_cmp(&a.value));
    for (i, c) in categories.iter_mut().enumerate() {
        c.color = PALETTE[i % PALETTE.len()].to_string();
    }

    Summary {
        count: txns.len(),
        income,
        expenses,
        net: income + raw_expenses,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::UNCATEGORIZED;

    fn txn(i: usize, amount: f64, category: &str) -> Transaction {
        Transaction::new(format!("txn-{i:05}"), "2024-01-01", "x", amount, category, "a.pdf")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_input() {
        let s = summarize(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.income, 0.0);
        assert_eq!(s.expenses, 0.0);
        assert_eq!(s.net, 0.0);
        assert!(s.categories.is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn test_food_travel_scenario() {
        let txns = vec![
            txn(0, 100.0, "Salary"),
            txn(1, -40.0, "Food"),
            txn(2, -10.0, "Food"),
            txn(3, -20.0, "Travel"),
        ];
        let s = summarize(&txns);
        assert_eq!(s.count, 4);
        assert!(approx(s.income, 100.0));
        assert!(approx(s.expenses, 70.0));
        assert!(approx(s.net, 30.0));

        assert_eq!(s.categories.len(), 2);
        assert_eq!(s.categories[0].name, "Food");
        assert!(approx(s.categories[0].value, 50.0));
        assert!((s.categories[0].percentage - 71.428).abs() < 0.01);
        assert_eq!(s.categories[1].name, "Travel");
        assert!(approx(s.categories[1].value, 20.0));
        assert!((s.categories[1].percentage - 28.571).abs() < 0.01);
    }

    #[test]
    fn test_income_never_enters_category_buckets() {
        let s = summarize(&[txn(0, 500.0, "Food"), txn(1, -5.0, "Food")]);
        assert_eq!(s.categories.len(), 1);
        assert!(approx(s.categories[0].value, 5.0));
    }

    #[test]
    fn test_zero_amount_counts_but_no_bucket() {
        let s = summarize(&[txn(0, 0.0, "Fees"), txn(1, 10.0, "Income")]);
        assert_eq!(s.count, 2);
        assert!(approx(s.income, 10.0));
        assert_eq!(s.expenses, 0.0);
        assert!(approx(s.net, 10.0));
        assert!(s.categories.is_empty());
    }

    #[test]
    fn test_no_expenses_gives_zero_percentages() {
        let s = summarize(&[txn(0, 10.0, "Income"), txn(1, 0.0, "Food")]);
        assert!(s.categories.iter().all(|c| c.percentage == 0.0));
    }

    #[test]
    fn test_sorted_descending_and_accounts_for_expenses() {
        let txns: Vec<_> = (0..30)
            .map(|i| {
                let cat = ["Food", "Travel", "Rent", "Fun", "Gym", "Tax", "Gifts", "Pets", "Kids", "Car"][i % 10];
                txn(i, -((i * 7 % 13) as f64 + 0.25), cat)
            })
            .chain([txn(99, 1000.0, "Income"), txn(100, 0.0, "Food")])
            .collect();
        let s = summarize(&txns);

        for w in s.categories.windows(2) {
            assert!(w[0].value >= w[1].value);
        }
        let total: f64 = s.categories.iter().map(|c| c.value).sum();
        assert!((total - s.expenses).abs() < 1e-6);
        let pct: f64 = s.categories.iter().map(|c| c.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-6);

        let sum_all: f64 = txns.iter().map(|t| t.amount).sum();
        assert!((s.net - sum_all).abs() < 1e-6);
        assert!(s.income >= 0.0 && s.expenses >= 0.0);
    }

    #[test]
    fn test_palette_cycles_in_sorted_order() {
        let txns: Vec<_> = (0..9).map(|i| txn(i, -((i + 1) as f64), &format!("C{i}"))).collect();
        let s = summarize(&txns);
        assert_eq!(s.categories[0].name, "C8");
        assert_eq!(s.categories[0].color, PALETTE[0]);
        assert_eq!(s.categories[7].color, PALETTE[7]);
        assert_eq!(s.categories[8].color, PALETTE[0]);
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let s = summarize(&[txn(0, -5.0, "Zoo"), txn(1, -5.0, "Art"), txn(2, -5.0, "Mid")]);
        let names: Vec<_> = s.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Art", "Mid", "Zoo"]);
    }

    #[test]
    fn test_uncategorized_is_its_own_bucket() {
        let s = summarize(&[txn(0, -3.0, UNCATEGORIZED), txn(1, -1.0, "Food")]);
        assert_eq!(s.categories[0].name, UNCATEGORIZED);
        assert!(approx(s.categories[0].value, 3.0));
    }
}
