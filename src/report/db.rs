//! Database operations for reports.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    report::{Report, ReportId},
};

/// Record a generated report.
///
/// The caller must only call this after the spreadsheet artifact has been
/// written: a row must never point at a file that does not exist.
pub fn create_report(
    name: &str,
    description: &str,
    file_url: &str,
    connection: &Connection,
) -> Result<Report, Error> {
    connection
        .prepare(
            "INSERT INTO report (name, description, file_url, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, description, file_url, created_at",
        )?
        .query_row(
            (name, description, file_url, OffsetDateTime::now_utc()),
            map_report_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all reports, newest first.
pub fn get_all_reports(connection: &Connection) -> Result<Vec<Report>, Error> {
    connection
        .prepare(
            "SELECT id, name, description, file_url, created_at
             FROM report ORDER BY created_at DESC, id DESC",
        )?
        .query_map([], map_report_row)?
        .map(|maybe_report| maybe_report.map_err(|error| error.into()))
        .collect()
}

/// Delete a report row by ID.
///
/// # Errors
/// This function will return an [Error::DeleteMissingReport] if `report_id`
/// does not refer to a valid report.
pub fn delete_report(report_id: ReportId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM report WHERE id = ?1", [report_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingReport);
    }

    Ok(())
}

/// Create the report table in the database.
pub fn create_report_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS report (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            file_url TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_report_row(row: &Row) -> Result<Report, rusqlite::Error> {
    Ok(Report {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        file_url: row.get(3)?,
        created_at: row.get(4)?,
    })
}
