//! Expense type creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

use super::{ExpenseTypeName, create_expense_type, domain::ExpenseTypeFormData};

/// The state needed for the new expense type page.
#[derive(Debug, Clone)]
pub struct NewExpenseTypePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewExpenseTypePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating an expense type.
#[derive(Debug, Clone)]
pub struct CreateExpenseTypeEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseTypeEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense type creation page.
pub async fn get_new_expense_type_page(State(_state): State<NewExpenseTypePageState>) -> Response {
    new_expense_type_view("", "").into_response()
}

/// Handle expense type creation form submission.
pub async fn create_expense_type_endpoint(
    State(state): State<CreateExpenseTypeEndpointState>,
    Form(form_data): Form<ExpenseTypeFormData>,
) -> Response {
    let name = match ExpenseTypeName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return new_expense_type_form_view(&form_data.name, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_expense_type(name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TYPES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense type: {error}");
            error.into_alert_response()
        }
    }
}

fn new_expense_type_view(type_name: &str, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TYPE_VIEW).into_html();
    let form = new_expense_type_form_view(type_name, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Expense Type", &[], &content)
}

fn new_expense_type_form_view(type_name: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_TYPE)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Expense Type Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Expense Type Name"
                    value=(type_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Expense Type" }
        }
    }
}
