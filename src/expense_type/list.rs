//! Expense types listing page.

use std::sync::{Arc, Mutex};

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

use super::{ExpenseType, get_all_expense_types};

/// The state needed for the expense types listing page.
#[derive(Debug, Clone)]
pub struct ExpenseTypesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseTypesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense types listing page.
pub async fn get_expense_types_page(
    State(state): State<ExpenseTypesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense_types = get_all_expense_types(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expense types: {error}"))?;

    Ok(expense_types_view(&expense_types).into_response())
}

fn expense_types_view(expense_types: &[ExpenseType]) -> Markup {
    let new_type_route = endpoints::NEW_TYPE_VIEW;
    let nav_bar = NavBar::new(endpoints::TYPES_VIEW).into_html();

    let table_row = |expense_type: &ExpenseType| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_TYPE_VIEW, expense_type.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_TYPE, expense_type.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Expenses using this type will keep it until edited.",
            expense_type.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (expense_type.name)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
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
                    h1 class="text-xl font-bold" { "Expense Types" }

                    a href=(new_type_route) class=(LINK_STYLE)
                    {
                        "Create Expense Type"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for expense_type in expense_types {
                                (table_row(expense_type))
                            }

                            @if expense_types.is_empty() {
                                tr
                                {
                                    td
                                        colspan="2"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expense types created yet. "
                                        a href=(new_type_route) class=(LINK_STYLE)
                                        {
                                            "Create your first expense type"
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

    base("Expense Types", &[], &content)
}
