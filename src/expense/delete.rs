//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertTemplate, html::render};

use super::{ExpenseId, db::delete_expense};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle expense deletion requests.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(expense_id, &connection) {
        Ok(_) => render(
            StatusCode::OK,
            AlertTemplate::success("Expense deleted successfully", "").into_markup(),
        ),
        Err(error @ Error::DeleteMissingExpense) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        expense::{
            Expense, PaymentMethod, create_expense, db::count_expenses,
            delete::DeleteExpenseEndpointState, delete_expense_endpoint,
        },
        expense_type::{ExpenseTypeName, create_expense_type},
    };

    fn get_test_state_with_expense() -> (DeleteExpenseEndpointState, i64) {
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
        .unwrap();
        let expense = create_expense(&builder, &connection).expect("Could not create test expense");

        (
            DeleteExpenseEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            expense.id,
        )
    }

    #[tokio::test]
    async fn delete_expense_succeeds() {
        let (state, expense_id) = get_test_state_with_expense();

        let response = delete_expense_endpoint(Path(expense_id), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_expenses(&connection), Ok(0));
    }

    #[tokio::test]
    async fn delete_expense_with_invalid_id_returns_not_found() {
        let (state, _) = get_test_state_with_expense();

        let response = delete_expense_endpoint(Path(999999), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_expenses(&connection), Ok(1));
    }
}
