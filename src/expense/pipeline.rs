//! The search, filter, sort and paginate pipeline behind the expenses page.
//!
//! The pipeline is pure: handlers load the full record set, run [view]
//! wholesale on every request, and render the result. Resetting the page
//! number when filters change is the caller's concern.

use crate::expense::{
    Expense, FilterSpec, SortSpec,
    sort::compare,
};

/// One page of a filtered and sorted expense listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseView {
    /// The expenses on the requested page.
    pub items: Vec<Expense>,
    /// The number of pages the filtered set spans.
    pub total_pages: u64,
}

/// Run the listing pipeline over `expenses`.
///
/// Steps, in order:
/// 1. If `search_term` is non-empty, keep records whose description, vendor
///    or location contains it case-insensitively.
/// 2. Keep records admitted by `filter`.
/// 3. Stable-sort the whole filtered set under `sort`, so records with equal
///    keys keep their insertion order.
/// 4. Cut the sorted set into `page_size`-sized pages and return the 1-based
///    `page`. A page past the end is empty, never an error.
pub fn view(
    expenses: Vec<Expense>,
    search_term: &str,
    filter: &FilterSpec,
    sort: &SortSpec,
    page: u64,
    page_size: u64,
) -> ExpenseView {
    let needle = search_term.trim().to_lowercase();

    let mut filtered: Vec<Expense> = expenses
        .into_iter()
        .filter(|expense| needle.is_empty() || matches_search(expense, &needle))
        .filter(|expense| filter.includes(expense))
        .collect();

    // Vec::sort_by is stable, which the sort comparator relies on for ties.
    filtered.sort_by(|a, b| compare(a, b, sort));

    let page_size = page_size.max(1);
    let total_pages = (filtered.len() as u64).div_ceil(page_size);

    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let items = filtered
        .into_iter()
        .skip(start as usize)
        .take(page_size as usize)
        .collect();

    ExpenseView { items, total_pages }
}

fn matches_search(expense: &Expense, needle: &str) -> bool {
    expense.description.to_lowercase().contains(needle)
        || expense.vendor.to_lowercase().contains(needle)
        || expense.location.to_lowercase().contains(needle)
}
