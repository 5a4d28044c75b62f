//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
};

/// Create a category and return it with its generated ID.
pub fn create_category(name: CategoryName, connection: &Connection) -> Result<Category, Error> {
    connection.execute("INSERT INTO category (name) VALUES (?1);", (name.as_ref(),))?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name. Returns an error if the category doesn't exist.
pub fn update_category(
    category_id: CategoryId,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Count the expenses that reference a category.
pub fn count_expenses_for_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .prepare("SELECT COUNT(*) FROM expense WHERE category_id = :id;")?
        .query_row(&[(":id", &category_id)], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete a category by ID.
///
/// Deletion is refused with [Error::CategoryInUse] while any expense still
/// references the category, so expense rows never point at a missing row.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let expense_count = count_expenses_for_category(category_id, connection)?;

    if expense_count > 0 {
        return Err(Error::CategoryInUse(expense_count));
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category { id, name })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            CategoryName, create_category, get_all_categories, get_category, update_category,
        },
        db::initialize,
        expense::{Expense, PaymentMethod, create_expense},
        expense_type::{ExpenseTypeName, create_expense_type},
    };

    use super::{count_expenses_for_category, create_category_table, delete_category};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();
        let name = CategoryName::new("Groceries").unwrap();

        let category = create_category(name.clone(), &connection);

        let got_category = category.expect("Could not create category");
        assert!(got_category.id > 0);
        assert_eq!(got_category.name, name);
    }

    #[test]
    fn get_category_succeeds() {
        let connection = get_test_db_connection();
        let name = CategoryName::new_unchecked("Travel");
        let inserted = create_category(name, &connection).expect("Could not create test category");

        let selected = get_category(inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();
        let inserted = create_category(CategoryName::new_unchecked("Travel"), &connection)
            .expect("Could not create test category");

        let selected = get_category(inserted.id + 123, &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_all_categories_returns_sorted_by_name() {
        let connection = get_test_db_connection();

        create_category(CategoryName::new_unchecked("Travel"), &connection)
            .expect("Could not create test category");
        create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");

        let names: Vec<String> = get_all_categories(&connection)
            .expect("Could not get all categories")
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, vec!["Groceries".to_string(), "Travel".to_string()]);
    }

    #[test]
    fn update_category_succeeds() {
        let connection = get_test_db_connection();
        let category = create_category(CategoryName::new_unchecked("Original"), &connection)
            .expect("Could not create test category");

        let new_name = CategoryName::new_unchecked("Updated");
        let result = update_category(category.id, new_name.clone(), &connection);

        assert!(result.is_ok());

        let updated = get_category(category.id, &connection).expect("Could not get category");
        assert_eq!(updated.name, new_name);
        assert_eq!(updated.id, category.id);
    }

    #[test]
    fn update_category_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = update_category(999999, CategoryName::new_unchecked("Updated"), &connection);

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        let category = create_category(CategoryName::new_unchecked("ToDelete"), &connection)
            .expect("Could not create test category");

        let result = delete_category(category.id, &connection);

        assert!(result.is_ok());
        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_category_with_invalid_id_returns_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let result = delete_category(999999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn delete_category_referenced_by_expense_is_refused() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let category = create_category(CategoryName::new_unchecked("Groceries"), &connection)
            .expect("Could not create test category");
        let expense_type = create_expense_type(ExpenseTypeName::new_unchecked("Food"), &connection)
            .expect("Could not create test expense type");

        let expense = Expense::build(
            "Weekly shop",
            42.50,
            time::macros::date!(2024 - 05 - 01),
            category.id,
            expense_type.id,
            PaymentMethod::Cash,
        )
        .expect("Could not build test expense");
        create_expense(&expense, &connection).expect("Could not create test expense");

        let result = delete_category(category.id, &connection);

        assert_eq!(result, Err(Error::CategoryInUse(1)));
        assert_eq!(
            count_expenses_for_category(category.id, &connection),
            Ok(1)
        );
        assert!(get_category(category.id, &connection).is_ok());
    }
}
