//! The dashboard page handler.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    category::{CategoryId, get_all_categories},
    expense::{Expense, get_all_expenses},
    html::{
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

use super::{
    aggregation::{DashboardSummary, recent_expenses, summarize},
    cards::summary_cards_view,
    charts::{DashboardChart, build_charts, charts_script, charts_view},
};

/// How many rows the recent-expenses table shows.
const RECENT_EXPENSE_LIMIT: usize = 5;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the dashboard with summary cards and spending charts.
pub async fn get_dashboard_page(
    State(state): State<DashboardPageState>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_all_expenses(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let category_names: HashMap<_, _> = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    let summary = summarize(&expenses, today);
    let charts = build_charts(&expenses, &category_names);

    Ok(dashboard_view(&summary, &charts, &expenses, &category_names).into_response())
}

fn current_local_date(local_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

fn dashboard_view(
    summary: &DashboardSummary,
    charts: &[DashboardChart],
    expenses: &[Expense],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                (summary_cards_view(summary))

                @if expenses.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No expenses recorded yet. "
                        a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                        {
                            "Record your first expense"
                        }
                    }
                } @else {
                    (charts_view(charts))
                    (recent_expenses_view(expenses, category_names))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts-6.0.0-min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

fn recent_expenses_view(
    expenses: &[Expense],
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let recent = recent_expenses(expenses, RECENT_EXPENSE_LIMIT);

    html!(
        section class="w-full mx-auto"
        {
            h2 class="text-lg font-semibold mb-2" { "Recent Expenses" }

            div class="relative overflow-x-auto shadow-md rounded-lg"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for expense in recent {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (expense.date) }
                                td class=(TABLE_CELL_STYLE) { (expense.description) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (category_names
                                        .get(&expense.category_id)
                                        .map(String::as_str)
                                        .unwrap_or("Unknown"))
                                }
                                td class=(TABLE_CELL_STYLE) { (format_currency(expense.amount)) }
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        expense::{Expense, PaymentMethod, create_expense},
        expense_type::{ExpenseTypeName, create_expense_type},
    };

    use super::{DashboardPageState, get_dashboard_page};

    fn get_test_state() -> DashboardPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        DashboardPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn dashboard_page_shows_summary_and_charts() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
                .expect("Could not create test category");
            let expense_type =
                create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
                    .expect("Could not create test expense type");

            let builder = Expense::build(
                "Weekly shop",
                42.50,
                date!(2024 - 05 - 01),
                category.id,
                expense_type.id,
                PaymentMethod::Cash,
            )
            .unwrap();
            create_expense(&builder, &connection).expect("Could not create test expense");
        }

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Total Spent"));
        assert!(body.contains("$42.50"));
        assert!(body.contains("monthly-spending-chart"));
        assert!(body.contains("category-spending-chart"));
        assert!(body.contains("Recent Expenses"));
        assert!(body.contains("Weekly shop"));
    }

    #[tokio::test]
    async fn dashboard_page_shows_empty_state() {
        let state = get_test_state();

        let response = get_dashboard_page(State(state)).await.unwrap();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("No expenses recorded yet."));
    }

    #[tokio::test]
    async fn dashboard_page_rejects_invalid_timezone() {
        let state = DashboardPageState {
            local_timezone: "Not/AZone".to_owned(),
            ..get_test_state()
        };

        let result = get_dashboard_page(State(state)).await;

        assert!(matches!(
            result,
            Err(crate::Error::InvalidTimezoneError(_))
        ));
    }
}
