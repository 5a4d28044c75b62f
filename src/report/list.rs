//! The reports page: the report builder form and the list of generated
//! reports, newest first.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::macros::format_description;

use crate::{
    AppState, Error, endpoints,
    category::{Category, get_all_categories},
    expense::PaymentMethod,
    expense_type::{ExpenseType, get_all_expense_types},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

use super::{Report, db::get_all_reports};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the reports page.
pub async fn get_reports_page(State(state): State<ReportsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let reports = get_all_reports(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve reports: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let expense_types = get_all_expense_types(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expense types: {error}"))?;

    Ok(reports_view(&reports, &categories, &expense_types).into_response())
}

fn reports_view(
    reports: &[Report],
    categories: &[Category],
    expense_types: &[ExpenseType],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-8 w-full lg:max-w-5xl"
            {
                section class="space-y-4"
                {
                    h1 class="text-xl font-bold" { "Generate Report" }

                    (report_builder_form(categories, expense_types))
                }

                section class="space-y-4"
                {
                    h2 class="text-xl font-bold" { "Generated Reports" }

                    (reports_table(reports))
                }
            }
        }
    );

    base("Reports", &[], &content)
}

fn report_builder_form(categories: &[Category], expense_types: &[ExpenseType]) -> Markup {
    let text_field = |id: &str, label: &str, input_type: &str| {
        html!(
            div
            {
                label for=(id) class=(FORM_LABEL_STYLE) { (label) }

                input
                    id=(id)
                    type=(input_type)
                    name=(id)
                    step=[(input_type == "number").then_some("0.01")]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        )
    };

    html!(
        form
            hx-post=(endpoints::POST_REPORT)
            hx-target-error="#alert-container"
            class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3 items-end"
        {
            (text_field("name", "Report Name", "text"))
            (text_field("description", "Description", "text"))
            (text_field("start_date", "From", "date"))
            (text_field("end_date", "To", "date"))
            (text_field("min_amount", "Min Amount", "number"))
            (text_field("max_amount", "Max Amount", "number"))

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_SELECT_STYLE)
                {
                    option value="all" { "All" }
                    @for category in categories {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            div
            {
                label for="expense_type" class=(FORM_LABEL_STYLE) { "Expense Type" }

                select id="expense_type" name="expense_type" class=(FORM_SELECT_STYLE)
                {
                    option value="all" { "All" }
                    @for expense_type in expense_types {
                        option value=(expense_type.id) { (expense_type.name) }
                    }
                }
            }

            div
            {
                label for="payment_method" class=(FORM_LABEL_STYLE) { "Payment Method" }

                select id="payment_method" name="payment_method" class=(FORM_SELECT_STYLE)
                {
                    option value="all" { "All" }
                    @for payment_method in [PaymentMethod::Cash, PaymentMethod::Transfer] {
                        option value=(payment_method.as_str()) { (payment_method) }
                    }
                }
            }

            div
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Generate Report" }
            }
        }
    )
}

fn reports_table(reports: &[Report]) -> Markup {
    let created_format = format_description!("[year]-[month]-[day] [hour]:[minute]");

    let table_row = |report: &Report| {
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_REPORT, report.id);
        let confirm_message = format!("Are you sure you want to delete '{}'?", report.name);
        let created_at = report
            .created_at
            .format(&created_format)
            .unwrap_or_else(|_| report.created_at.to_string());

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (report.name) }
                td class=(TABLE_CELL_STYLE) { (report.description) }
                td class=(TABLE_CELL_STYLE) { (created_at) }

                td class=(TABLE_CELL_STYLE)
                {
                    a href=(report.file_url) download class=(LINK_STYLE) { "Download" }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-swap="delete"
                        hx-target-error="#alert-container"
                    {
                        "Delete"
                    }
                }
            }
        )
    };

    html!(
        section class="dark:bg-gray-800 w-full overflow-x-auto"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Download" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for report in reports {
                        (table_row(report))
                    }

                    @if reports.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No reports generated yet."
                            }
                        }
                    }
                }
            }
        }
    )
}
