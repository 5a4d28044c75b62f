//! Expense type deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertTemplate, html::render};

use super::{ExpenseTypeId, db::delete_expense_type};

/// The state needed for deleting an expense type.
#[derive(Debug, Clone)]
pub struct DeleteExpenseTypeEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseTypeEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle expense type deletion requests.
///
/// Deletion succeeds even when expenses still reference the type; those
/// expenses keep their stored type ID.
pub async fn delete_expense_type_endpoint(
    Path(type_id): Path<ExpenseTypeId>,
    State(state): State<DeleteExpenseTypeEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense_type(type_id, &connection) {
        Ok(_) => render(
            StatusCode::OK,
            AlertTemplate::success("Expense type deleted successfully", "").into_markup(),
        ),
        Err(error @ Error::DeleteMissingExpenseType) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense type {type_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
