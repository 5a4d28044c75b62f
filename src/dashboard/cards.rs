//! Summary cards for the dashboard.

use maud::{Markup, html};

use crate::html::format_currency;

use super::aggregation::DashboardSummary;

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";
const CARD_LABEL_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";
const CARD_VALUE_STYLE: &str = "text-2xl font-semibold";

/// Renders the headline spending figures as a row of cards.
pub(super) fn summary_cards_view(summary: &DashboardSummary) -> Markup {
    let card = |label: &str, value: String| {
        html!(
            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { (label) }
                p class=(CARD_VALUE_STYLE) { (value) }
            }
        )
    };

    html!(
        section class="w-full mx-auto mb-8"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (card("Spent This Month", format_currency(summary.current_month_total)))
                (card("Total Spent", format_currency(summary.total)))
                (card("Expenses Recorded", summary.count.to_string()))
                (card("Average Expense", format_currency(summary.mean)))
            }
        }
    )
}
