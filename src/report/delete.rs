//! Report deletion endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertTemplate, html::render};

use super::{
    ReportId,
    db::{delete_report, get_all_reports},
};

/// The state needed for deleting a report.
#[derive(Debug, Clone)]
pub struct DeleteReportEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for DeleteReportEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}

/// Handle report deletion requests.
///
/// The stored spreadsheet is removed best-effort after the row: a leftover
/// file is only wasted disk, while a row without a file is a broken link.
pub async fn delete_report_endpoint(
    Path(report_id): Path<ReportId>,
    State(state): State<DeleteReportEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let file_url = get_all_reports(&connection)
        .ok()
        .and_then(|reports| {
            reports
                .into_iter()
                .find(|report| report.id == report_id)
                .map(|report| report.file_url)
        });

    match delete_report(report_id, &connection) {
        Ok(_) => {
            if let Some(file_url) = file_url {
                remove_artifact(&file_url, &state.upload_dir);
            }

            render(
                StatusCode::OK,
                AlertTemplate::success("Report deleted successfully", "").into_markup(),
            )
        }
        Err(error @ Error::DeleteMissingReport) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting report {report_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn remove_artifact(file_url: &str, upload_dir: &std::path::Path) {
    // file_url looks like "/uploads/reports/<file name>"; only the last two
    // segments map onto the upload directory.
    let mut segments = file_url.rsplit('/');
    let Some(file_name) = segments.next() else {
        return;
    };
    let Some(subdir) = segments.next() else {
        return;
    };

    let file_path = upload_dir.join(subdir).join(file_name);
    if let Err(error) = std::fs::remove_file(&file_path) {
        tracing::warn!("could not remove report artifact {file_path:?}: {error}");
    }
}
