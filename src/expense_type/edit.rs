//! Expense type editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
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

use super::{
    ExpenseTypeId, ExpenseTypeName, db::update_expense_type, domain::ExpenseTypeFormData,
    get_expense_type,
};

/// The state needed for the edit expense type page.
#[derive(Debug, Clone)]
pub struct EditExpenseTypePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseTypePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating an expense type.
#[derive(Debug, Clone)]
pub struct UpdateExpenseTypeEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateExpenseTypeEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense type editing page.
pub async fn get_edit_expense_type_page(
    Path(type_id): Path<ExpenseTypeId>,
    State(state): State<EditExpenseTypePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_TYPE_VIEW, type_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TYPE, type_id);

    match get_expense_type(type_id, &connection) {
        Ok(expense_type) => Ok(edit_expense_type_view(
            &edit_endpoint,
            &update_endpoint,
            expense_type.name.as_ref(),
            "",
        )
        .into_response()),
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Expense type not found",
                _ => {
                    tracing::error!("Failed to retrieve expense type {type_id}: {error}");
                    "Failed to load expense type"
                }
            };

            Ok(
                edit_expense_type_view(&edit_endpoint, &update_endpoint, "", error_message)
                    .into_response(),
            )
        }
    }
}

/// Handle expense type update form submission.
pub async fn update_expense_type_endpoint(
    Path(type_id): Path<ExpenseTypeId>,
    State(state): State<UpdateExpenseTypeEndpointState>,
    Form(form_data): Form<ExpenseTypeFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TYPE, type_id);

    let name = match ExpenseTypeName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_expense_type_form_view(
                &update_endpoint,
                &form_data.name,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_expense_type(type_id, name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TYPES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingExpenseType) => {
            Error::UpdateMissingExpenseType.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense type {type_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_expense_type_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    type_name: &str,
    error_message: &str,
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = edit_expense_type_form_view(update_endpoint, type_name, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Expense Type", &[], &content)
}

fn edit_expense_type_form_view(
    update_endpoint: &str,
    type_name: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Expense Type" }
        }
    }
}
