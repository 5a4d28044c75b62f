//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertTemplate, html::render};

use super::{CategoryId, db::delete_category};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion requests.
///
/// Deletion is refused while expenses still reference the category.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, &connection) {
        Ok(_) => render(
            StatusCode::OK,
            AlertTemplate::success("Category deleted successfully", "").into_markup(),
        ),
        Err(error @ (Error::DeleteMissingCategory | Error::CategoryInUse(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{
            CategoryName, create_category, delete::DeleteCategoryEndpointState,
            delete_category_endpoint, get_category,
        },
        db::initialize,
        expense::{Expense, PaymentMethod, create_expense},
        expense_type::{ExpenseTypeName, create_expense_type},
    };

    fn get_test_state() -> DeleteCategoryEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        DeleteCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn delete_category_succeeds() {
        let state = get_test_state();
        let category = create_category(
            CategoryName::new_unchecked("ToDelete"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test category");

        let response = delete_category_endpoint(Path(category.id), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_category(category.id, &connection).is_err());
    }

    #[tokio::test]
    async fn delete_category_with_invalid_id_returns_not_found() {
        let state = get_test_state();

        let response = delete_category_endpoint(Path(999999), State(state)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_category_in_use_returns_error_and_keeps_row() {
        let state = get_test_state();
        let (category, expense_type) = {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
                .expect("Could not create test category");
            let expense_type =
                create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
                    .expect("Could not create test expense type");

            let expense = Expense::build(
                "Weekly shop",
                42.50,
                date!(2024 - 05 - 01),
                category.id,
                expense_type.id,
                PaymentMethod::Cash,
            )
            .expect("Could not build test expense");
            create_expense(&expense, &connection).expect("Could not create test expense");

            (category, expense_type)
        };
        let _ = expense_type;

        let response = delete_category_endpoint(Path(category.id), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_category(category.id, &connection).is_ok());
    }
}
