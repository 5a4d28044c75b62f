//! Database initialization for the application's domain models.

use rusqlite::Connection;

use crate::{
    category::create_category_table, expense::create_expense_table,
    expense_type::create_expense_type_table, report::create_report_table,
};

/// Create the tables for the application's domain models.
///
/// Safe to call on an existing database, tables are only created if missing.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    create_category_table(connection)?;
    create_expense_type_table(connection)?;
    create_expense_table(connection)?;
    create_report_table(connection)?;

    Ok(())
}
