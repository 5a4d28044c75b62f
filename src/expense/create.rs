//! Expense creation page and endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{Category, get_all_categories},
    expense_type::{ExpenseType, get_all_expense_types},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::{
    create_expense,
    form::{ExpenseFormValues, FormMethod, build_expense, expense_form_view, read_expense_multipart},
    receipt::save_receipt,
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for CreateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}

/// Render the expense creation page.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let expense_types = get_all_expense_types(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expense types: {error}"))?;

    Ok(new_expense_view(&categories, &expense_types).into_response())
}

/// Handle expense creation form submission.
///
/// The form is multipart so it can carry an optional receipt file; the file
/// is stored before the expense row is inserted.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseEndpointState>,
    multipart: Multipart,
) -> Response {
    let form = match read_expense_multipart(multipart).await {
        Ok(form) => form,
        Err(error) => {
            tracing::error!("Failed to parse expense multipart form: {error}");
            return error.into_alert_response();
        }
    };

    let mut builder = match build_expense(&form) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    if let Some((file_name, data)) = &form.receipt {
        match save_receipt(file_name, data, &state.upload_dir) {
            Ok(receipt_url) => builder = builder.receipt_url(Some(receipt_url)),
            Err(error) => return error.into_alert_response(),
        }
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_expense(&builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::InvalidForeignKey) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");
            error.into_alert_response()
        }
    }
}

fn new_expense_view(categories: &[Category], expense_types: &[ExpenseType]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = expense_form_view(
        FormMethod::Post,
        endpoints::POST_EXPENSE,
        "Record Expense",
        &ExpenseFormValues::default(),
        categories,
        expense_types,
        "",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Expense", &[], &content)
}
