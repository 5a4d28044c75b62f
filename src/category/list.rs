//! Categories listing page.

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

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
};

use super::{Category, CategoryId, get_all_categories};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with its expense count and formatted edit URL for rendering.
#[derive(Debug, Clone)]
struct CategoryListItem {
    pub category: Category,
    pub edit_url: String,
    pub expense_count: u32,
}

/// Render the categories listing page with expense counts.
pub async fn get_categories_page(State(state): State<CategoriesPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let expenses_per_category = count_expenses_per_category(&connection)
        .inspect_err(|error| tracing::error!("Could not count expenses per category: {error}"))?;

    let list_items = categories
        .into_iter()
        .map(|category| {
            let expense_count = *expenses_per_category.get(&category.id).unwrap_or(&0);

            CategoryListItem {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
                category,
                expense_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&list_items).into_response())
}

fn count_expenses_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare("SELECT category_id, COUNT(1) FROM expense GROUP BY category_id")?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn categories_view(categories: &[CategoryListItem]) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |item: &CategoryListItem| {
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, item.category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'?",
            item.category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (item.category.name)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (item.expense_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &item.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                section class="dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for item in categories {
                                (table_row(item))
                            }

                            @if categories.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories created yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create your first category"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Categories", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{
            CategoryName, create_category,
            list::{CategoriesPageState, count_expenses_per_category, get_categories_page},
        },
        db::initialize,
        expense::{Expense, PaymentMethod, create_expense},
        expense_type::{ExpenseTypeName, create_expense_type},
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn counts_expenses_per_category() {
        let connection = get_test_db_connection();
        let groceries = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");
        let travel = create_category(CategoryName::new_unchecked("Travel"), &connection)
            .expect("Could not create test category");
        let expense_type = create_expense_type(ExpenseTypeName::new_unchecked("Misc"), &connection)
            .expect("Could not create test expense type");

        for i in 0..3 {
            let expense = Expense::build(
                &format!("Shop {i}"),
                10.0 + i as f64,
                date!(2024 - 05 - 01),
                groceries.id,
                expense_type.id,
                PaymentMethod::Cash,
            )
            .expect("Could not build test expense");
            create_expense(&expense, &connection).expect("Could not create test expense");
        }

        let counts = count_expenses_per_category(&connection).expect("Could not count expenses");

        assert_eq!(counts.get(&groceries.id), Some(&3));
        assert_eq!(counts.get(&travel.id), None);
    }

    #[tokio::test]
    async fn categories_page_lists_categories() {
        let connection = get_test_db_connection();
        create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");

        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state)).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Groceries"));
        assert!(body.contains("Create Category"));
    }
}
