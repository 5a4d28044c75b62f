//! Expense aggregation for the dashboard cards and charts.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{category::CategoryId, expense::Expense};

/// The name shown for expenses whose category no longer exists.
const UNKNOWN_LABEL: &str = "Unknown";

/// Headline spending figures for the summary cards.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardSummary {
    pub total: f64,
    pub count: usize,
    pub mean: f64,
    /// Total spent in the calendar month `today` falls in.
    pub current_month_total: f64,
}

pub(super) fn summarize(expenses: &[Expense], today: Date) -> DashboardSummary {
    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
    let count = expenses.len();
    let mean = if count == 0 { 0.0 } else { total / count as f64 };

    let current_month_total = expenses
        .iter()
        .filter(|expense| {
            expense.date.year() == today.year() && expense.date.month() == today.month()
        })
        .map(|expense| expense.amount)
        .sum();

    DashboardSummary {
        total,
        count,
        mean,
        current_month_total,
    }
}

/// Sum spending per calendar month, chronological.
///
/// Months are keyed by their first day so they sort naturally.
pub(super) fn monthly_totals(expenses: &[Expense]) -> Vec<(Date, f64)> {
    let mut totals: HashMap<Date, f64> = HashMap::new();

    for expense in expenses {
        // The first of the month is always a valid day.
        if let Ok(month) = expense.date.replace_day(1) {
            *totals.entry(month).or_insert(0.0) += expense.amount;
        }
    }

    let mut sorted: Vec<_> = totals.into_iter().collect();
    sorted.sort_by_key(|(month, _)| *month);
    sorted
}

/// Format month keys as short labels, e.g. "May 2024".
pub(super) fn format_month_labels(months: &[Date]) -> Vec<String> {
    let month_to_str = |month: Month| match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    months
        .iter()
        .map(|date| format!("{} {}", month_to_str(date.month()), date.year()))
        .collect()
}

/// The most recently dated expenses, newest first.
///
/// Same-day expenses tie-break on ID so the latest recorded one leads.
pub(super) fn recent_expenses(expenses: &[Expense], limit: usize) -> Vec<&Expense> {
    let mut sorted: Vec<&Expense> = expenses.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    sorted.truncate(limit);
    sorted
}

/// Sum spending per category name, biggest first.
pub(super) fn category_totals(
    expenses: &[Expense],
    category_names: &HashMap<CategoryId, String>,
) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for expense in expenses {
        let name = category_names
            .get(&expense.category_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_owned());

        match index_by_name.get(&name) {
            Some(&index) => totals[index].1 += expense.amount,
            None => {
                index_by_name.insert(name.clone(), totals.len());
                totals.push((name, expense.amount));
            }
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}
