//! Expense editing page and endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Multipart, Path, State},
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
    ExpenseId,
    db::update_expense,
    form::{ExpenseFormValues, FormMethod, build_expense, expense_form_view, read_expense_multipart},
    get_expense,
    receipt::save_receipt,
};

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating an expense.
#[derive(Debug, Clone)]
pub struct UpdateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for UpdateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}

/// Render the expense editing page.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpensePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expense {expense_id}: {error}"))?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let expense_types = get_all_expense_types(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expense types: {error}"))?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    Ok(edit_expense_view(
        &edit_endpoint,
        &update_endpoint,
        &ExpenseFormValues::from(&expense),
        &categories,
        &expense_types,
    )
    .into_response())
}

/// Handle expense update form submission.
///
/// A newly uploaded receipt replaces the stored one; submitting without a
/// file keeps the existing receipt.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<UpdateExpenseEndpointState>,
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

    // No new upload: keep the receipt already stored on the expense.
    if builder.receipt_url.is_none() {
        match get_expense(expense_id, &connection) {
            Ok(existing) => builder = builder.receipt_url(existing.receipt_url),
            Err(Error::NotFound) => return Error::UpdateMissingExpense.into_alert_response(),
            Err(error) => {
                tracing::error!("Failed to retrieve expense {expense_id}: {error}");
                return error.into_alert_response();
            }
        }
    }

    match update_expense(expense_id, &builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingExpense | Error::InvalidForeignKey)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_expense_view(
    edit_endpoint: &str,
    update_endpoint: &str,
    values: &ExpenseFormValues,
    categories: &[Category],
    expense_types: &[ExpenseType],
) -> Markup {
    let nav_bar = NavBar::new(edit_endpoint).into_html();
    let form = expense_form_view(
        FormMethod::Put,
        update_endpoint,
        "Update Expense",
        values,
        categories,
        expense_types,
        "",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Expense", &[], &content)
}

#[cfg(test)]
mod edit_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{FromRequest, Multipart, Path, State},
        http::{Request, StatusCode},
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryId, CategoryName, create_category},
        db::initialize,
        endpoints,
        expense::{
            Expense, ExpenseId, PaymentMethod, create_expense,
            edit::{EditExpensePageState, UpdateExpenseEndpointState},
            get_edit_expense_page, get_expense, update_expense_endpoint,
        },
        expense_type::{ExpenseTypeId, ExpenseTypeName, create_expense_type},
    };

    fn get_test_connection() -> (Arc<Mutex<Connection>>, CategoryId, ExpenseTypeId, ExpenseId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

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
        .receipt_url(Some("/uploads/receipts/original.png".to_owned()));
        let expense = create_expense(&builder, &connection).expect("Could not create test expense");

        (
            Arc::new(Mutex::new(connection)),
            category.id,
            expense_type.id,
            expense.id,
        )
    }

    async fn must_make_multipart(fields: &[(&str, &str)]) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let mut lines: Vec<String> = Vec::new();

        for (name, value) in fields {
            lines.push(format!("--{boundary}"));
            lines.push(format!("Content-Disposition: form-data; name=\"{name}\""));
            lines.push("".to_owned());
            lines.push((*value).to_owned());
        }

        lines.push(format!("--{boundary}--"));

        let data = lines.join("\r\n").into_bytes();

        let request = Request::builder()
            .method("PUT")
            .uri("/api/expenses/1")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let (db_connection, _, _, expense_id) = get_test_connection();
        let state = EditExpensePageState { db_connection };

        let response = get_edit_expense_page(Path(expense_id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("value=\"Weekly shop\""));
        assert!(body.contains("View current receipt"));
    }

    #[tokio::test]
    async fn update_expense_overwrites_fields_and_keeps_receipt() {
        let (db_connection, category_id, type_id, expense_id) = get_test_connection();
        let state = UpdateExpenseEndpointState {
            db_connection: db_connection.clone(),
            upload_dir: std::env::temp_dir(),
        };

        let multipart = must_make_multipart(&[
            ("description", "Fortnightly shop"),
            ("amount", "85.00"),
            ("date", "2024-05-02"),
            ("category", &category_id.to_string()),
            ("expense_type", &type_id.to_string()),
            ("payment_method", "TRANSFER"),
            ("vendor", "New World"),
            ("location", ""),
        ])
        .await;

        let response = update_expense_endpoint(Path(expense_id), State(state), multipart)
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let redirect = response.headers().get("hx-redirect").unwrap();
        assert_eq!(redirect, endpoints::EXPENSES_VIEW);

        let connection = db_connection.lock().unwrap();
        let updated = get_expense(expense_id, &connection).unwrap();
        assert_eq!(updated.description, "Fortnightly shop");
        assert_eq!(updated.amount, 85.00);
        assert_eq!(updated.payment_method, PaymentMethod::Transfer);
        assert_eq!(
            updated.receipt_url.as_deref(),
            Some("/uploads/receipts/original.png")
        );
    }

    #[tokio::test]
    async fn update_expense_with_invalid_id_returns_not_found() {
        let (db_connection, category_id, type_id, _) = get_test_connection();
        let state = UpdateExpenseEndpointState {
            db_connection,
            upload_dir: std::env::temp_dir(),
        };

        let multipart = must_make_multipart(&[
            ("description", "Anything"),
            ("amount", "1.00"),
            ("date", "2024-05-02"),
            ("category", &category_id.to_string()),
            ("expense_type", &type_id.to_string()),
            ("payment_method", "CASH"),
        ])
        .await;

        let response = update_expense_endpoint(Path(999999), State(state), multipart)
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
