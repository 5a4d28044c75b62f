//! Spendlog is a web app for recording and analyzing day-to-day expenses.
//!
//! Expenses are categorized, tagged with an expense type and payment method,
//! and can carry an uploaded receipt. The app serves HTML pages directly:
//! an expense list with filtering, sorting and pagination, a dashboard with
//! spending charts, and a report generator that exports multi-sheet
//! spreadsheets.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod expense;
mod expense_type;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod routing;
mod timezone;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::AlertTemplate,
    html::render,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used for an expense description.
    #[error("expense description cannot be empty")]
    EmptyDescription,

    /// A zero or negative amount was used for an expense.
    #[error("{0} is not a valid expense amount, amounts must be positive")]
    NonPositiveAmount(f64),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create an expense type name.
    #[error("expense type name cannot be empty")]
    EmptyExpenseTypeName,

    /// A string other than CASH or TRANSFER was used as a payment method.
    #[error("\"{0}\" is not a valid payment method")]
    InvalidPaymentMethod(String),

    /// A date string in a form could not be parsed as a calendar date.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// A query referenced a category or expense type that does not exist.
    #[error("the category or expense type ID does not refer to a valid row")]
    InvalidForeignKey,

    /// The category is referenced by expenses and cannot be deleted.
    #[error("the category is used by {0} expense(s) and cannot be deleted")]
    CategoryInUse(u32),

    /// The active report filters matched zero expenses.
    ///
    /// This is a reported condition rather than a technical failure: the
    /// client should adjust the filters, and no report artifact is created.
    #[error("no expenses matched the report filters")]
    NoMatchingExpenses,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The multipart form for an expense or report could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// A receipt or report file could not be written to the upload directory.
    ///
    /// When this occurs while generating a report, no report row is created.
    #[error("could not write file to storage: {0}")]
    StorageError(String),

    /// The spreadsheet library failed to serialize the report workbook.
    #[error("could not build report workbook: {0}")]
    WorkbookError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update an expense type that does not exist
    #[error("tried to update an expense type that is not in the database")]
    UpdateMissingExpenseType,

    /// Tried to delete an expense type that does not exist
    #[error("tried to delete an expense type that is not in the database")]
    DeleteMissingExpenseType,

    /// Tried to delete a report that does not exist
    #[error("tried to delete a report that is not in the database")]
    DeleteMissingReport,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Error::WorkbookError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPageTemplate {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::EmptyDescription => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Invalid description", "The description cannot be empty.")
                    .into_markup(),
            ),
            Error::NonPositiveAmount(amount) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid amount",
                    &format!("{amount} is not a valid amount. Amounts must be greater than zero."),
                )
                .into_markup(),
            ),
            Error::EmptyCategoryName => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Invalid category name", "The name cannot be empty.")
                    .into_markup(),
            ),
            Error::EmptyExpenseTypeName => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Invalid expense type name", "The name cannot be empty.")
                    .into_markup(),
            ),
            Error::InvalidPaymentMethod(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid payment method",
                    &format!("\"{raw}\" is not a valid payment method. Choose cash or transfer."),
                )
                .into_markup(),
            ),
            Error::InvalidDate(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid date",
                    &format!("\"{raw}\" could not be read as a date."),
                )
                .into_markup(),
            ),
            Error::InvalidForeignKey => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid category or type",
                    "The selected category or expense type could not be found. \
                    Try refreshing the page and submitting again.",
                )
                .into_markup(),
            ),
            Error::CategoryInUse(expense_count) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Could not delete category",
                    &format!(
                        "This category is used by {expense_count} expense(s). \
                        Reassign or delete those expenses first."
                    ),
                )
                .into_markup(),
            ),
            Error::NoMatchingExpenses => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "No expenses found",
                    "No expenses matched the selected filters. \
                    Adjust your filters and try again.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingExpense => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update expense", "The expense could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingExpense => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete expense",
                    "The expense could not be found. \
                    Try refreshing the page to see if the expense has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update category",
                    "The category could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingExpenseType => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not update expense type",
                    "The expense type could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingExpenseType => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete expense type",
                    "The expense type could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingReport => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete report",
                    "The report could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                )
                .into_markup(),
            ),
            Error::StorageError(_) | Error::WorkbookError(_) => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Could not save the file",
                    "The file could not be written. Nothing was recorded, \
                    check the server logs and try again.",
                )
                .into_markup(),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_markup(),
            ),
        }
    }
}
