//! Integer-percent category breakdowns

use serde::{Deserialize, Serialize};

/// One category's amount and its share of the breakdown total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare<K> {
    pub category: K,
    pub amount: f64,
    pub percent: i32,
}

/// Split `items` into integer percentages of their total.
///
/// Every category but the last is rounded independently and the last one
/// receives `100 - sum(others)`, so a non-zero breakdown always sums to
/// exactly 100. When the rounded shares already exceed 100 the last
/// category goes negative (`[50.5, 49.5, 0.0]` gives `[51, 50, -1]`).
/// A zero total yields all-zero percentages.
pub fn ratio_breakdown<K: Copy>(items: &[(K, f64)]) -> Vec<CategoryShare<K>> {
    let total: f64 = items.iter().map(|(_, amount)| amount).sum();
    let has_total = total > 0.0 && total.is_finite();

    let mut allocated = 0;
    let last = items.len().saturating_sub(1);

    items
        .iter()
        .enumerate()
        .map(|(index, &(category, amount))| {
            let percent = if !has_total {
                0
            } else if index == last {
                100 - allocated
            } else {
                let share = (amount / total * 100.0).round() as i32;
                allocated += share;
                share
            };
            CategoryShare { category, amount, percent }
        })
        .collect()
}
