//! The expenses page: a searchable, filterable, sortable, paginated table.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    category::{Category, CategoryId, get_all_categories},
    expense_type::{ExpenseType, ExpenseTypeId, get_all_expense_types},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
};

use super::{
    Expense, PaymentMethod,
    filter::FilterForm,
    get_all_expenses,
    pipeline::view,
    sort::{SortDirection, SortKey, SortSpec},
};

/// The name shown for a category or type that no longer exists.
const UNKNOWN_NAME: &str = "Unknown";

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters of the expenses page.
///
/// Unset fields keep their defaults, so a bare `/expenses` URL works. The
/// struct also serializes back into a query string for building the sortable
/// column header and pagination links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl ExpensesQuery {
    fn filter_form(&self) -> FilterForm {
        FilterForm {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            min_amount: self.min_amount.clone(),
            max_amount: self.max_amount.clone(),
            category: self.category.clone(),
            expense_type: self.expense_type.clone(),
            payment_method: self.payment_method.clone(),
        }
    }

    fn sort_spec(&self) -> SortSpec {
        match self.sort {
            Some(key) => SortSpec {
                key,
                direction: self.direction.unwrap_or(SortDirection::Ascending),
            },
            None => SortSpec::default(),
        }
    }

    /// The query for sorting by `key`: a repeated click on the active column
    /// toggles the direction, switching columns starts ascending. Either way
    /// the page resets to the first.
    fn with_sort(&self, key: SortKey) -> Self {
        let current = self.sort_spec();
        let direction = if current.key == key {
            current.direction.toggled()
        } else {
            SortDirection::Ascending
        };

        Self {
            sort: Some(key),
            direction: Some(direction),
            page: None,
            ..self.clone()
        }
    }

    fn with_page(&self, page: u64) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    fn to_url(&self) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{}?{query}", endpoints::EXPENSES_VIEW),
            Ok(_) => endpoints::EXPENSES_VIEW.to_owned(),
            Err(error) => {
                tracing::error!("Could not encode expenses query: {error}");
                endpoints::EXPENSES_VIEW.to_owned()
            }
        }
    }
}

/// An expense with the names and URLs its table row needs.
struct ExpenseRow {
    expense: Expense,
    category_name: String,
    expense_type_name: String,
    edit_url: String,
    delete_url: String,
}

/// Render the expenses page.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let filter_spec = query.filter_form().to_spec()?;
    let sort_spec = query.sort_spec();
    let page = query.page.unwrap_or(state.pagination_config.default_page);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_all_expenses(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let expense_types = get_all_expense_types(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expense types: {error}"))?;

    let expense_view = view(
        expenses,
        query.search.as_deref().unwrap_or(""),
        &filter_spec,
        &sort_spec,
        page,
        state.pagination_config.default_page_size,
    );

    let category_names: HashMap<CategoryId, String> = categories
        .iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();
    let type_names: HashMap<ExpenseTypeId, String> = expense_types
        .iter()
        .map(|expense_type| (expense_type.id, expense_type.name.to_string()))
        .collect();

    let rows = expense_view
        .items
        .into_iter()
        .map(|expense| ExpenseRow {
            category_name: category_names
                .get(&expense.category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_NAME.to_owned()),
            expense_type_name: type_names
                .get(&expense.expense_type_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_NAME.to_owned()),
            edit_url: endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
            expense,
        })
        .collect::<Vec<_>>();

    let indicators = create_pagination_indicators(
        page,
        expense_view.total_pages,
        state.pagination_config.max_pages,
    );

    Ok(
        expenses_page_view(&query, &rows, &indicators, &categories, &expense_types)
            .into_response(),
    )
}

fn expenses_page_view(
    query: &ExpensesQuery,
    rows: &[ExpenseRow],
    indicators: &[PaginationIndicator],
    categories: &[Category],
    expense_types: &[ExpenseType],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                    {
                        "Record Expense"
                    }
                }

                (filter_form_view(query, categories, expense_types))

                section class="dark:bg-gray-800 w-full overflow-x-auto"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                (sortable_header(query, SortKey::Date, "Date"))
                                (sortable_header(query, SortKey::Description, "Description"))
                                (sortable_header(query, SortKey::Amount, "Amount"))
                                (sortable_header(query, SortKey::Category, "Category"))
                                (sortable_header(query, SortKey::ExpenseType, "Type"))
                                (sortable_header(query, SortKey::PaymentMethod, "Payment"))
                                (sortable_header(query, SortKey::Vendor, "Vendor"))
                                (sortable_header(query, SortKey::Location, "Location"))
                                th scope="col" class=(TABLE_CELL_STYLE) { "Receipt" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="10"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expenses match. "
                                        a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                                        {
                                            "Record an expense"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_view(query, indicators))
            }
        }
    );

    base("Expenses", &[], &content)
}

fn table_row(row: &ExpenseRow) -> Markup {
    let confirm_message = format!(
        "Are you sure you want to delete '{}'?",
        row.expense.description
    );

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.expense.date) }
            td class=(TABLE_CELL_STYLE) { (row.expense.description) }
            td class=(TABLE_CELL_STYLE) { (format_currency(row.expense.amount)) }
            td class=(TABLE_CELL_STYLE) { (row.category_name) }
            td class=(TABLE_CELL_STYLE) { (row.expense_type_name) }
            td class=(TABLE_CELL_STYLE) { (row.expense.payment_method) }
            td class=(TABLE_CELL_STYLE) { (row.expense.vendor) }
            td class=(TABLE_CELL_STYLE) { (row.expense.location) }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(receipt_url) = &row.expense.receipt_url {
                    a href=(receipt_url) target="_blank" class=(LINK_STYLE) { "View" }
                } @else {
                    span class="text-gray-400" { "-" }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    )
}

fn sortable_header(query: &ExpensesQuery, key: SortKey, label: &str) -> Markup {
    let spec = query.sort_spec();
    let indicator = if spec.key == key {
        match spec.direction {
            SortDirection::Ascending => " \u{25B2}",
            SortDirection::Descending => " \u{25BC}",
        }
    } else {
        ""
    };

    html!(
        th scope="col" class=(TABLE_CELL_STYLE)
        {
            a href=(query.with_sort(key).to_url()) class="hover:underline"
            {
                (label)
                (indicator)
            }
        }
    )
}

fn filter_form_view(
    query: &ExpensesQuery,
    categories: &[Category],
    expense_types: &[ExpenseType],
) -> Markup {
    let text_filter = |id: &str, label: &str, input_type: &str, value: &Option<String>| {
        html!(
            div
            {
                label for=(id) class=(FORM_LABEL_STYLE) { (label) }

                input
                    id=(id)
                    type=(input_type)
                    name=(id)
                    value=[value.as_deref()]
                    step=[(input_type == "number").then_some("0.01")]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        )
    };

    let selected_id = |value: &Option<String>, id: i64| value.as_deref() == Some(&id.to_string());

    html!(
        form
            method="get"
            action=(endpoints::EXPENSES_VIEW)
            class="grid gap-4 sm:grid-cols-2 lg:grid-cols-4 items-end"
        {
            (text_filter("search", "Search", "search", &query.search))
            (text_filter("start_date", "From", "date", &query.start_date))
            (text_filter("end_date", "To", "date", &query.end_date))
            (text_filter("min_amount", "Min Amount", "number", &query.min_amount))
            (text_filter("max_amount", "Max Amount", "number", &query.max_amount))

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_SELECT_STYLE)
                {
                    option value="all" { "All" }
                    @for category in categories {
                        option
                            value=(category.id)
                            selected[selected_id(&query.category, category.id)]
                        {
                            (category.name)
                        }
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
                        option
                            value=(expense_type.id)
                            selected[selected_id(&query.expense_type, expense_type.id)]
                        {
                            (expense_type.name)
                        }
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
                        option
                            value=(payment_method.as_str())
                            selected[
                                query.payment_method.as_deref() == Some(payment_method.as_str())
                            ]
                        {
                            (payment_method)
                        }
                    }
                }
            }

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }

                a href=(endpoints::EXPENSES_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    )
}

fn pagination_view(query: &ExpensesQuery, indicators: &[PaginationIndicator]) -> Markup {
    let page_link_style = "flex items-center justify-center px-3 h-8 leading-tight
        text-gray-500 bg-white border border-gray-300 hover:bg-gray-100
        hover:text-gray-700 dark:bg-gray-800 dark:border-gray-700
        dark:text-gray-400 dark:hover:bg-gray-700 dark:hover:text-white";
    let curr_page_style = "flex items-center justify-center px-3 h-8
        text-blue-600 border border-gray-300 bg-blue-50 hover:bg-blue-100
        hover:text-blue-700 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

    let page_link = |page: u64, label: String| {
        html!(
            li
            {
                a href=(query.with_page(page).to_url()) class=(page_link_style) { (label) }
            }
        )
    };

    html!(
        @if !indicators.is_empty() {
            nav class="pagination flex justify-center" aria-label="Expense pages"
            {
                ul class="pagination inline-flex -space-x-px text-sm"
                {
                    @for indicator in indicators {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                (page_link(*page, "Previous".to_owned()))
                            }
                            PaginationIndicator::Page(page) => {
                                (page_link(*page, page.to_string()))
                            }
                            PaginationIndicator::CurrPage(page) => {
                                li
                                {
                                    span aria-current="page" class=(curr_page_style)
                                    {
                                        (page)
                                    }
                                }
                            }
                            PaginationIndicator::Ellipsis => {
                                li
                                {
                                    span class=(page_link_style) { "..." }
                                }
                            }
                            PaginationIndicator::NextButton(page) => {
                                (page_link(*page, "Next".to_owned()))
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod expenses_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        expense::{
            Expense, PaymentMethod, create_expense,
            list::{ExpensesPageState, ExpensesQuery, get_expenses_page},
        },
        expense_type::{ExpenseTypeName, create_expense_type, delete_expense_type},
        pagination::PaginationConfig,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn make_state(connection: Connection) -> ExpensesPageState {
        ExpensesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            pagination_config: PaginationConfig::default(),
        }
    }

    async fn response_body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn expenses_page_lists_expenses() {
        let connection = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");
        let expense_type = create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
            .expect("Could not create test expense type");

        let builder = Expense::build(
            "Weekly shop",
            42.50,
            date!(2024 - 05 - 01),
            category.id,
            expense_type.id,
            PaymentMethod::Cash,
        )
        .unwrap()
        .vendor("Countdown");
        create_expense(&builder, &connection).unwrap();

        let state = make_state(connection);
        let response = get_expenses_page(State(state), Query(ExpensesQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response_body(response).await;
        assert!(body.contains("Weekly shop"));
        assert!(body.contains("$42.50"));
        assert!(body.contains("Countdown"));
        assert!(body.contains("Groceries"));
    }

    #[tokio::test]
    async fn expenses_page_applies_min_amount_filter() {
        let connection = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");
        let expense_type = create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
            .expect("Could not create test expense type");

        for (description, amount) in [("Cheap snack", 5.0), ("Big shop", 120.0)] {
            let builder = Expense::build(
                description,
                amount,
                date!(2024 - 05 - 01),
                category.id,
                expense_type.id,
                PaymentMethod::Cash,
            )
            .unwrap();
            create_expense(&builder, &connection).unwrap();
        }

        let state = make_state(connection);
        let query = ExpensesQuery {
            min_amount: Some("50".to_owned()),
            ..Default::default()
        };

        let response = get_expenses_page(State(state), Query(query)).await.unwrap();
        let body = response_body(response).await;

        assert!(body.contains("Big shop"));
        assert!(!body.contains("Cheap snack"));
    }

    #[tokio::test]
    async fn expenses_page_shows_requested_page() {
        let connection = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");
        let expense_type = create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
            .expect("Could not create test expense type");

        for i in 1..=25 {
            let builder = Expense::build(
                &format!("Expense {i:02}"),
                10.0,
                date!(2024 - 05 - 01),
                category.id,
                expense_type.id,
                PaymentMethod::Cash,
            )
            .unwrap();
            create_expense(&builder, &connection).unwrap();
        }

        let state = make_state(connection);
        let query = ExpensesQuery {
            page: Some(3),
            ..Default::default()
        };

        let response = get_expenses_page(State(state), Query(query)).await.unwrap();
        let body = response_body(response).await;

        // Default sort is by date; equal dates keep insertion order, so the
        // third page of 25 records holds the last five.
        assert!(body.contains("Expense 21"));
        assert!(body.contains("Expense 25"));
        assert!(!body.contains("Expense 01"));
        assert!(!body.contains("Expense 20"));
    }

    #[tokio::test]
    async fn expenses_page_shows_unknown_for_deleted_type() {
        let connection = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");
        let expense_type = create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
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
        create_expense(&builder, &connection).unwrap();

        delete_expense_type(expense_type.id, &connection)
            .expect("Could not delete test expense type");

        let state = make_state(connection);
        let response = get_expenses_page(State(state), Query(ExpensesQuery::default()))
            .await
            .unwrap();
        let body = response_body(response).await;

        assert!(body.contains("Unknown"));
    }

    #[test]
    fn with_sort_toggles_active_column() {
        let query = ExpensesQuery {
            sort: Some(crate::expense::SortKey::Amount),
            direction: Some(crate::expense::SortDirection::Ascending),
            ..Default::default()
        };

        let toggled = query.with_sort(crate::expense::SortKey::Amount);
        assert_eq!(
            toggled.direction,
            Some(crate::expense::SortDirection::Descending)
        );

        let switched = query.with_sort(crate::expense::SortKey::Vendor);
        assert_eq!(switched.sort, Some(crate::expense::SortKey::Vendor));
        assert_eq!(
            switched.direction,
            Some(crate::expense::SortDirection::Ascending)
        );
    }

    #[test]
    fn to_url_round_trips_filters() {
        let query = ExpensesQuery {
            search: Some("coffee".to_owned()),
            min_amount: Some("5".to_owned()),
            page: Some(2),
            ..Default::default()
        };

        let url = query.with_page(3).to_url();

        assert!(url.starts_with("/expenses?"));
        assert!(url.contains("search=coffee"));
        assert!(url.contains("min_amount=5"));
        assert!(url.contains("page=3"));
    }
}
