//! Database operations for expenses.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    expense::{Expense, ExpenseBuilder, ExpenseId},
    expense_type::ExpenseTypeId,
};

/// Create a new expense in the database from a builder.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidForeignKey] if the category or expense type ID does not
///   refer to an existing row,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_expense(builder: &ExpenseBuilder, connection: &Connection) -> Result<Expense, Error> {
    ensure_expense_type_exists(builder.expense_type_id, connection)?;

    connection
        .prepare(
            "INSERT INTO expense
                (description, amount, date, category_id, expense_type_id,
                 payment_method, vendor, location, receipt_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, description, amount, date, category_id,
                 expense_type_id, payment_method, vendor, location, receipt_url",
        )?
        .query_row(
            (
                &builder.description,
                builder.amount,
                builder.date,
                builder.category_id,
                builder.expense_type_id,
                builder.payment_method,
                &builder.vendor,
                &builder.location,
                &builder.receipt_url,
            ),
            map_expense_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve an expense from the database by its ID.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `expense_id` does not refer to a valid expense,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, category_id, expense_type_id,
                payment_method, vendor, location, receipt_url
             FROM expense WHERE id = :id",
        )?
        .query_row(&[(":id", &expense_id)], map_expense_row)
        .map_err(|error| error.into())
}

/// Retrieve all expenses in insertion order.
///
/// The fixed ordering gives the filter and sort pipeline a deterministic
/// baseline, so a stable sort preserves insertion order across tied keys.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, category_id, expense_type_id,
                payment_method, vendor, location, receipt_url
             FROM expense ORDER BY id ASC",
        )?
        .query_map([], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Overwrite an expense with the builder's fields.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingExpense] if `expense_id` does not refer to a valid expense,
/// - [Error::InvalidForeignKey] if the category or expense type ID does not
///   refer to an existing row,
/// - [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    expense_id: ExpenseId,
    builder: &ExpenseBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_expense_type_exists(builder.expense_type_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE expense SET
            description = ?1, amount = ?2, date = ?3, category_id = ?4,
            expense_type_id = ?5, payment_method = ?6, vendor = ?7,
            location = ?8, receipt_url = ?9
         WHERE id = ?10",
        (
            &builder.description,
            builder.amount,
            builder.date,
            builder.category_id,
            builder.expense_type_id,
            builder.payment_method,
            &builder.vendor,
            &builder.location,
            &builder.receipt_url,
            expense_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense by ID.
///
/// # Errors
/// This function will return an [Error::DeleteMissingExpense] if `expense_id`
/// does not refer to a valid expense.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Get the total number of expenses in the database.
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the expense table in the database.
///
/// Expense types carry no foreign key: deleting a type must leave referencing
/// expenses in place, so referential integrity for types is checked at
/// insert/update time instead.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            expense_type_id INTEGER NOT NULL,
            payment_method TEXT NOT NULL,
            vendor TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            receipt_url TEXT,
            FOREIGN KEY(category_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);
        CREATE INDEX IF NOT EXISTS idx_expense_category ON expense(category_id);",
    )?;

    Ok(())
}

fn ensure_expense_type_exists(
    expense_type_id: ExpenseTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    let exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM expense_type WHERE id = ?1)",
        [expense_type_id],
        |row| row.get(0),
    )?;

    if exists { Ok(()) } else { Err(Error::InvalidForeignKey) }
}

/// Map a database row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        category_id: row.get(4)?,
        expense_type_id: row.get(5)?,
        payment_method: row.get(6)?,
        vendor: row.get(7)?,
        location: row.get(8)?,
        receipt_url: row.get(9)?,
    })
}
