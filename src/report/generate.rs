//! Report generation endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Form, FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    category::get_all_categories,
    expense::{FilterForm, get_all_expenses},
    expense_type::get_all_expense_types,
};

use super::{aggregation::aggregate, db::create_report, workbook::build_workbook};

/// The subdirectory of the upload directory that report artifacts land in.
pub const REPORTS_SUBDIR: &str = "reports";

/// The state needed for generating a report.
#[derive(Debug, Clone)]
pub struct GenerateReportEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for GenerateReportEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}

/// The raw fields of the report builder form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReportForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub category: Option<String>,
    pub expense_type: Option<String>,
    pub payment_method: Option<String>,
}

impl ReportForm {
    fn filter_form(&self) -> FilterForm {
        FilterForm {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            min_amount: self.min_amount.clone(),
            max_amount: self.max_amount.clone(),
            category: self.category.clone(),
            expense_type: self.expense_type.clone(),
            payment_method: self.payment_method.clone(),
        }
    }
}

/// Handle report generation form submission.
///
/// The spreadsheet artifact is written before the report row is recorded,
/// so a storage failure leaves no row pointing at a missing file.
pub async fn generate_report_endpoint(
    State(state): State<GenerateReportEndpointState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let filter_spec = match form.filter_form().to_spec() {
        Ok(filter_spec) => filter_spec,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let workbook_bytes = {
        let expenses = match get_all_expenses(&connection) {
            Ok(expenses) => expenses,
            Err(error) => {
                tracing::error!("Failed to retrieve expenses: {error}");
                return error.into_alert_response();
            }
        };
        let category_names = match get_all_categories(&connection) {
            Ok(categories) => categories
                .into_iter()
                .map(|category| (category.id, category.name.to_string()))
                .collect(),
            Err(error) => {
                tracing::error!("Failed to retrieve categories: {error}");
                return error.into_alert_response();
            }
        };
        let type_names = match get_all_expense_types(&connection) {
            Ok(expense_types) => expense_types
                .into_iter()
                .map(|expense_type| (expense_type.id, expense_type.name.to_string()))
                .collect(),
            Err(error) => {
                tracing::error!("Failed to retrieve expense types: {error}");
                return error.into_alert_response();
            }
        };

        let bundle = match aggregate(&expenses, &filter_spec, &category_names, &type_names) {
            Ok(bundle) => bundle,
            Err(error) => return error.into_alert_response(),
        };

        match build_workbook(&bundle) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::error!("Failed to build report workbook: {error}");
                return error.into_alert_response();
            }
        }
    };

    let file_url = match store_report_file(&workbook_bytes, &state.upload_dir) {
        Ok(file_url) => file_url,
        Err(error) => return error.into_alert_response(),
    };

    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Expense Report");
    let description = form.description.as_deref().map(str::trim).unwrap_or("");

    match create_report(name, description, &file_url, &connection) {
        Ok(report) => {
            tracing::info!("Generated report '{}' at {}", report.name, report.file_url);
            (
                HxRedirect(endpoints::REPORTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while recording a report: {error}");
            error.into_alert_response()
        }
    }
}

/// Write the workbook bytes under the reports subdirectory and return the
/// URL path the artifact is served at.
fn store_report_file(workbook_bytes: &[u8], upload_dir: &std::path::Path) -> Result<String, Error> {
    let file_name = format!(
        "Expense_Report_{}.xlsx",
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    );

    let reports_dir = upload_dir.join(REPORTS_SUBDIR);

    std::fs::create_dir_all(&reports_dir)
        .inspect_err(|error| {
            tracing::error!("could not create reports directory {reports_dir:?}: {error}")
        })
        .map_err(|error| Error::StorageError(error.to_string()))?;

    let file_path = reports_dir.join(&file_name);

    std::fs::write(&file_path, workbook_bytes)
        .inspect_err(|error| tracing::error!("could not write report {file_path:?}: {error}"))
        .map_err(|error| Error::StorageError(error.to_string()))?;

    Ok(format!(
        "{}/{REPORTS_SUBDIR}/{file_name}",
        endpoints::UPLOADS
    ))
}
