//! Database operations for expense types.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    expense_type::{ExpenseType, ExpenseTypeId, ExpenseTypeName},
};

/// Create an expense type and return it with its generated ID.
pub fn create_expense_type(
    name: ExpenseTypeName,
    connection: &Connection,
) -> Result<ExpenseType, Error> {
    connection.execute(
        "INSERT INTO expense_type (name) VALUES (?1);",
        (name.as_ref(),),
    )?;

    let id = connection.last_insert_rowid();

    Ok(ExpenseType { id, name })
}

/// Retrieve a single expense type by ID.
pub fn get_expense_type(
    expense_type_id: ExpenseTypeId,
    connection: &Connection,
) -> Result<ExpenseType, Error> {
    connection
        .prepare("SELECT id, name FROM expense_type WHERE id = :id;")?
        .query_row(&[(":id", &expense_type_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all expense types ordered alphabetically by name.
pub fn get_all_expense_types(connection: &Connection) -> Result<Vec<ExpenseType>, Error> {
    connection
        .prepare("SELECT id, name FROM expense_type ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_expense_type| maybe_expense_type.map_err(|error| error.into()))
        .collect()
}

/// Update an expense type's name. Returns an error if the type doesn't exist.
pub fn update_expense_type(
    expense_type_id: ExpenseTypeId,
    new_name: ExpenseTypeName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense_type SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), expense_type_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpenseType);
    }

    Ok(())
}

/// Delete an expense type by ID.
///
/// Expenses referencing the type are left untouched and keep the stored ID.
pub fn delete_expense_type(
    expense_type_id: ExpenseTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM expense_type WHERE id = ?1", [expense_type_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpenseType);
    }

    Ok(())
}

/// Initialize the expense type table and indexes.
pub fn create_expense_type_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense_type (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_type_name ON expense_type(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<ExpenseType, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = ExpenseTypeName::new_unchecked(&raw_name);

    Ok(ExpenseType { id, name })
}
